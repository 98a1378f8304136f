//! Line console over a UART
//!
//! Bytes are collected until CR or LF. Backspace and DEL erase the last
//! character, other control bytes are dropped, and characters past the
//! line capacity are discarded.

use core::fmt;

use embedded_io::{Read, Write};
use heapless::String;

use crate::command::{CommandTable, Dispatched};

/// Default line capacity
pub const DEFAULT_LINE_LEN: usize = 64;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Console failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError<E> {
    /// UART read or write failed
    #[error("uart error: {0:?}")]
    Uart(E),
    /// A handler failed to format its output
    #[error("console output formatting failed")]
    Format,
}

/// Line-oriented console
pub struct Console<U: embedded_io::ErrorType, const N: usize = DEFAULT_LINE_LEN> {
    uart: U,
    line: String<N>,
    echo: bool,
    write_error: Option<U::Error>,
}

impl<U: Read + Write, const N: usize> Console<U, N> {
    /// Console without echo
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            line: String::new(),
            echo: false,
            write_error: None,
        }
    }

    /// Echo received characters back to the terminal
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Block until a non-empty line arrives.
    ///
    /// Returns `None` once the UART reports end of stream with nothing
    /// buffered.
    pub fn read_line(&mut self) -> Result<Option<String<N>>, ConsoleError<U::Error>> {
        self.line.clear();
        loop {
            let mut byte = [0u8; 1];
            let n = self.uart.read(&mut byte).map_err(ConsoleError::Uart)?;
            if n == 0 {
                if self.line.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(core::mem::take(&mut self.line)));
            }

            let [b] = byte;
            match b {
                b'\r' | b'\n' => {
                    if self.line.is_empty() {
                        continue;
                    }
                    self.echo_bytes(b"\r\n")?;
                    return Ok(Some(core::mem::take(&mut self.line)));
                }
                BACKSPACE | DELETE => {
                    if self.line.pop().is_some() {
                        self.echo_bytes(b"\x08 \x08")?;
                    }
                }
                b if b.is_ascii_graphic() || b == b' ' => {
                    if self.line.push(char::from(b)).is_ok() {
                        self.echo_bytes(&[b])?;
                    } else {
                        tracing::warn!(capacity = N, "console line full, byte dropped");
                    }
                }
                _ => {}
            }
        }
    }

    /// Print the command list, then dispatch lines until end of stream
    pub fn run<D, const M: usize>(
        &mut self,
        table: &CommandTable<D, M>,
        device: &mut D,
    ) -> Result<(), ConsoleError<U::Error>> {
        let listed = table.display_cmd_list(self);
        self.check(listed)?;

        while let Some(line) = self.read_line()? {
            let outcome = table.dispatch(device, &line, self);
            match self.check(outcome)? {
                Dispatched::Ran(index) | Dispatched::MissingParams(index) => {
                    tracing::debug!(index, "command handled");
                }
                Dispatched::Unknown | Dispatched::Empty => {}
            }
            self.uart.flush().map_err(ConsoleError::Uart)?;
        }
        Ok(())
    }

    /// Give back the UART
    pub fn release(self) -> U {
        self.uart
    }

    fn echo_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError<U::Error>> {
        if self.echo {
            self.uart.write_all(bytes).map_err(ConsoleError::Uart)?;
        }
        Ok(())
    }

    /// Recover the UART error hidden behind a `fmt::Error`
    fn check<T>(&mut self, result: Result<T, fmt::Error>) -> Result<T, ConsoleError<U::Error>> {
        result.map_err(|_| match self.write_error.take() {
            Some(e) => ConsoleError::Uart(e),
            None => ConsoleError::Format,
        })
    }
}

impl<U: Read + Write, const N: usize> fmt::Write for Console<U, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.uart.write_all(s.as_bytes()).map_err(|e| {
            self.write_error = Some(e);
            fmt::Error
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandInfo};
    use noos::mocks::MockUart;

    fn echo_cmd(_: &mut (), out: &mut dyn fmt::Write, params: &[f64]) -> fmt::Result {
        write!(out, "got {}\r\n", params.len())
    }

    #[test]
    fn lines_split_on_cr_and_lf() {
        let uart = MockUart::new();
        uart.feed(b"voltage?1\r\n\r\ngain?\n");
        let mut console: Console<_> = Console::new(uart);
        assert_eq!(console.read_line().unwrap().unwrap(), "voltage?1");
        assert_eq!(console.read_line().unwrap().unwrap(), "gain?");
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn backspace_erases() {
        let uart = MockUart::new();
        uart.feed(b"gaim\x08n?\x7F?\r");
        let mut console: Console<_> = Console::new(uart);
        assert_eq!(console.read_line().unwrap().unwrap(), "gain?");
    }

    #[test]
    fn echo_mirrors_input() {
        let uart = MockUart::new();
        uart.feed(b"ab\x08c\r");
        let mut console: Console<_> = Console::new(uart.clone()).with_echo(true);
        console.read_line().unwrap();
        assert_eq!(uart.sent(), b"ab\x08 \x08c\r\n");
    }

    #[test]
    fn overlong_line_is_truncated() {
        let uart = MockUart::new();
        uart.feed(b"0123456789\r");
        let mut console: Console<_, 4> = Console::new(uart);
        assert_eq!(console.read_line().unwrap().unwrap(), "0123");
    }

    #[test]
    fn unterminated_last_line_is_returned() {
        let uart = MockUart::new();
        uart.feed(b"help?");
        let mut console: Console<_> = Console::new(uart);
        assert_eq!(console.read_line().unwrap().unwrap(), "help?");
        assert_eq!(console.read_line().unwrap(), None);
    }

    #[test]
    fn run_dispatches_until_end_of_stream() {
        let table = CommandTable::new([Command {
            info: CommandInfo {
                name: "echo",
                description: "Counts parameters.",
                accepted_value: "",
                example: "echo 1 2",
                min_params: 0,
            },
            handler: echo_cmd,
        }]);
        let uart = MockUart::new();
        uart.feed(b"echo 1 2\r\nbogus\r\n");
        let mut console: Console<_> = Console::new(uart.clone());
        console.run(&table, &mut ()).unwrap();
        assert_eq!(
            uart.sent_string(),
            "Available commands:\r\necho - Counts parameters.\r\ngot 2\r\nInvalid command!\r\n"
        );
    }
}
