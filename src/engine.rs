//! Seam to the embedded interpreter that runs translated code.

use crate::command::ExitCode;
use anyhow::Result;
use std::io::Write;

/// Executes translated source text.
///
/// Implementations wrap the embedded interpreter. The console hands over the output of
/// [`crate::Translator::translate`] unmodified and never inspects what the engine does
/// with it, other than the returned exit code.
pub trait ScriptEngine {
    /// Runs `code`, writing anything it prints to `stdout`.
    fn execute(&mut self, code: &str, stdout: &mut dyn Write) -> Result<ExitCode>;
}

/// Dry-run engine: prints the translated code instead of running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoEngine;

impl ScriptEngine for EchoEngine {
    fn execute(&mut self, code: &str, stdout: &mut dyn Write) -> Result<ExitCode> {
        stdout.write_all(code.as_bytes())?;
        if !code.ends_with('\n') {
            writeln!(stdout)?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_engine_terminates_output_line() {
        let mut out = Vec::new();
        assert_eq!(EchoEngine.execute("pos(x, 1)", &mut out).unwrap(), 0);
        assert_eq!(EchoEngine.execute("a()\nb()\n", &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "pos(x, 1)\na()\nb()\n");
    }
}
