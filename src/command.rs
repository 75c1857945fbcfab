use crate::session::Session;
use anyhow::Result;
use std::io::Write;

/// Conventional exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Meta commands and script engines both report their outcome this way.
pub type ExitCode = i32;

/// Object-safe trait for any meta command the console can run.
///
/// Meta commands are the `:`-prefixed lines that configure or inspect the session
/// instead of being translated and executed.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, session: &mut Session)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Name the command is invoked by, without the leading `:`.
    fn name(&self) -> &'static str;

    /// One-line description for `:help`.
    fn description(&self) -> &'static str;

    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
