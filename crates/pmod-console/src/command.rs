//! Command table and dispatcher
//!
//! A console line is matched against a fixed table by literal,
//! case-sensitive prefix. Parameters follow the command name directly
//! (`voltage?1`, `gain=0`); further ones are separated by spaces.
//!
//! Each [`Command`] row carries its name, help text, example and handler
//! together, so a table cannot have a name without a handler or a handler
//! without help text.

use core::fmt::{self, Write};

use heapless::Vec;

/// Most parameters a command line can carry
pub const MAX_PARAMS: usize = 4;

/// Parameters parsed from one command line
pub type Params = Vec<f64, MAX_PARAMS>;

/// Command handler: `(device, console output, parameters)`
pub type Handler<D> = fn(&mut D, &mut dyn Write, &[f64]) -> fmt::Result;

/// Help text for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    /// Literal prefix typed on the console, e.g. `voltage?`
    pub name: &'static str,
    /// What the command does
    pub description: &'static str,
    /// Accepted parameter values, empty when the command takes none
    pub accepted_value: &'static str,
    /// Example invocation
    pub example: &'static str,
    /// Parameters that must be present before the handler runs
    pub min_params: usize,
}

/// One row of a command table
pub struct Command<D> {
    /// Help text
    pub info: CommandInfo,
    /// Operation run on a match
    pub handler: Handler<D>,
}

/// What [`CommandTable::dispatch`] did with a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Nothing but whitespace
    Empty,
    /// No command matched
    Unknown,
    /// Command matched but too few parameters were given
    MissingParams(usize),
    /// Handler of the command at this index ran
    Ran(usize),
}

/// Fixed set of commands for one device
pub struct CommandTable<D, const N: usize> {
    commands: [Command<D>; N],
}

impl<D, const N: usize> CommandTable<D, N> {
    /// Table over `commands`, matched in order
    pub const fn new(commands: [Command<D>; N]) -> Self {
        Self { commands }
    }

    /// Rows in match order
    pub fn commands(&self) -> &[Command<D>] {
        &self.commands
    }

    /// Number of commands
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the table has no commands
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// First command whose name prefixes `line`, with its parameters
    pub fn find(&self, line: &str) -> Option<(usize, Params)> {
        let line = line.trim();
        self.commands
            .iter()
            .enumerate()
            .find_map(|(index, cmd)| {
                line.strip_prefix(cmd.info.name)
                    .map(|rest| (index, parse_params(rest)))
            })
    }

    /// Run the command matching `line` against `device`.
    ///
    /// Unknown lines print `Invalid command!`; a matched command with too
    /// few parameters prints its usage instead of running.
    pub fn dispatch(
        &self,
        device: &mut D,
        line: &str,
        out: &mut dyn Write,
    ) -> Result<Dispatched, fmt::Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Dispatched::Empty);
        }

        let Some((index, params)) = self.find(line) else {
            tracing::debug!(line, "unknown command");
            out.write_str("Invalid command!\r\n")?;
            return Ok(Dispatched::Unknown);
        };
        let Some(cmd) = self.commands.get(index) else {
            return Ok(Dispatched::Unknown);
        };

        if params.len() < cmd.info.min_params {
            tracing::debug!(command = cmd.info.name, "missing parameter");
            self.display_error(index, out)?;
            return Ok(Dispatched::MissingParams(index));
        }

        tracing::trace!(command = cmd.info.name, params = params.len(), "dispatch");
        (cmd.handler)(device, out, &params)?;
        Ok(Dispatched::Ran(index))
    }

    /// Print `Invalid parameter!` followed by the usage of command `index`
    pub fn display_error(&self, index: usize, out: &mut dyn Write) -> fmt::Result {
        out.write_str("Invalid parameter!\r\n")?;
        if let Some(cmd) = self.commands.get(index) {
            write_usage(out, &cmd.info)?;
            write!(out, "Example: {}\r\n", cmd.info.example)?;
        }
        Ok(())
    }

    /// Print the usage line of every command
    pub fn display_cmd_list(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str("Available commands:\r\n")?;
        for cmd in &self.commands {
            write_usage(out, &cmd.info)?;
        }
        Ok(())
    }
}

fn write_usage(out: &mut dyn Write, info: &CommandInfo) -> fmt::Result {
    if info.accepted_value.is_empty() {
        write!(out, "{} - {}\r\n", info.name, info.description)
    } else {
        write!(
            out,
            "{} - {} {}\r\n",
            info.name, info.description, info.accepted_value
        )
    }
}

/// Parse up to [`MAX_PARAMS`] space-separated decimal numbers.
///
/// Parsing stops at the first token that is not a number.
pub fn parse_params(text: &str) -> Params {
    let mut params = Params::new();
    for token in text.split(' ').filter(|t| !t.is_empty()) {
        let Ok(value) = token.parse::<f64>() else {
            break;
        };
        if params.push(value).is_err() {
            break;
        }
    }
    params
}

/// Clamp a parameter to `[lo, hi]`
#[must_use]
pub fn param_limit(value: f64, lo: f64, hi: f64) -> f64 {
    noos::util::clamp_param(value, lo, hi)
}

/// Clamp a parameter to `[lo, hi]` and drop its fraction.
///
/// NaN clamps to `lo`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped first
pub fn param_index(value: f64, lo: u32, hi: u32) -> u32 {
    let clamped = param_limit(value, f64::from(lo), f64::from(hi));
    (clamped as u32).clamp(lo, hi.max(lo))
}

/// Print a failed device operation
pub fn report_error(out: &mut dyn Write, err: &dyn fmt::Display) -> fmt::Result {
    tracing::warn!(error = %err, "command failed");
    write!(out, "Error: {err}\r\n")
}
