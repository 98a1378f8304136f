//! Host console for a simulated PmodAD2 or PmodAD3
//!
//! Run with: cargo run -p pmod-console --features host -- --board ad3
//!
//! Commands are read from stdin, or from `--script`, and answered on
//! stdout. Logs go to stderr; set `RUST_LOG=debug` to see dispatch.

// Host tooling binary: docs are the clap help.
#![allow(missing_docs)]

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read as _, Write as _};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use pmod_console::parameters::{self, pmod_ad2, pmod_ad3};
use pmod_console::sim::{SimAd7780, SimAd7991, SimPmodAd2, SimPmodAd3};
use pmod_console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Board {
    /// PmodAD2: AD7991, 4 channels over I2C
    Ad2,
    /// PmodAD3: AD7780, 24-bit over SPI
    Ad3,
}

#[derive(Parser)]
#[command(name = "pmod-console")]
#[command(about = "UART command console for a simulated PmodAD2 / PmodAD3", long_about = None)]
#[command(version)]
struct Cli {
    /// Board to simulate
    #[arg(long, value_enum, default_value_t = Board::Ad3)]
    board: Board,

    /// Reference voltage (AD7780 REFIN, or the AD7991 external reference)
    #[arg(long)]
    vref: Option<f32>,

    /// Simulated input in volts (every AD7991 channel, or AD7780 AIN)
    #[arg(long, default_value_t = 0.5)]
    input: f32,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Echo received characters, as a terminal session would
    #[arg(long)]
    echo: bool,
}

/// stdin/stdout (or a script file) seen as a UART
struct StdioUart {
    input: Box<dyn BufRead>,
    output: io::Stdout,
}

impl embedded_io::ErrorType for StdioUart {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for StdioUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.input
            .read(buf)
            .map_err(|_| embedded_io::ErrorKind::Other)
    }
}

impl embedded_io::Write for StdioUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output
            .write(buf)
            .map_err(|_| embedded_io::ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.output
            .flush()
            .map_err(|_| embedded_io::ErrorKind::Other)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let uart = StdioUart {
        input,
        output: io::stdout(),
    };
    let mut console: Console<_, { parameters::LINE_LEN }> =
        Console::new(uart).with_echo(cli.echo);

    match cli.board {
        Board::Ad3 => {
            let vref = cli.vref.unwrap_or(pmod_ad3::VREF_VOLTS);
            let sim = SimAd7780::new(vref, cli.input * 1000.0);
            let mut board = sim.board();
            let status = board
                .init()
                .map_err(|e| anyhow!("PmodAD3 init failed: {e}"))?;
            tracing::info!(status = status.0, vref, "simulated AD7780 ready");
            console
                .run(&SimPmodAd3::commands(), &mut board)
                .map_err(|e| anyhow!("console: {e}"))?;
        }
        Board::Ad2 => {
            let ext_ref = cli.vref.unwrap_or(pmod_ad2::EXT_REF_VOLTS);
            let sim = SimAd7991::new(pmod_ad2::VDD_VOLTS, ext_ref, cli.input);
            let mut board = sim.board();
            board
                .init()
                .map_err(|e| anyhow!("PmodAD2 init failed: {e}"))?;
            tracing::info!(ext_ref, "simulated AD7991 ready");
            console
                .run(&SimPmodAd2::commands(), &mut board)
                .map_err(|e| anyhow!("console: {e}"))?;
        }
    }

    tracing::info!("end of input");
    Ok(())
}
