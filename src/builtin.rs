use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::config::validate_alias_name;
use crate::console::Factory;
use crate::lexer;
use crate::script;
use crate::session::Session;
use crate::translator::AliasKind;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Meta commands known to the console at compile time.
///
/// Meta commands are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// against the session; they are never translated or sent to the script engine.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command without the `:` prefix, e.g. "alias".
    fn name() -> &'static str;

    /// One-line summary shown by `:help`.
    fn description() -> &'static str;

    /// Executes the command using the console output and session.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, session) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{}: {:#}", T::name(), e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _session: &mut Session) -> Result<i32> {
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn description(&self) -> &'static str {
        T::description()
    }

    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Register one or more names as aliases that may be called without parentheses.
pub struct Alias {
    #[argh(switch, short = 'v')]
    /// collect bare arguments into a single list argument.
    pub vararg: bool,

    #[argh(positional)]
    /// names to register; each must be a valid identifier.
    pub names: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn description() -> &'static str {
        "register command-style aliases"
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        if self.names.is_empty() {
            return Err(anyhow::anyhow!("no alias name given"));
        }
        for name in &self.names {
            validate_alias_name(name)?;
        }
        for name in self.names {
            info!(alias = name.as_str(), vararg = self.vararg, "registering alias");
            if self.vararg {
                session.translator.add_aliased_vararg_command(name);
            } else {
                session.translator.add_aliased_command(name);
            }
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List registered aliases.
pub struct Aliases {}

impl BuiltinCommand for Aliases {
    fn name() -> &'static str {
        "aliases"
    }

    fn description() -> &'static str {
        "list registered aliases"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        for (name, kind) in session.translator.aliases().iter() {
            let kind = match kind {
                AliasKind::Plain => "plain",
                AliasKind::Vararg => "vararg",
            };
            writeln!(stdout, "{name}\t{kind}")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Show how a line would be rewritten without executing it.
pub struct Translate {
    #[argh(positional, greedy)]
    /// text to translate; words are joined by single spaces.
    pub text: Vec<String>,
}

impl BuiltinCommand for Translate {
    fn name() -> &'static str {
        "translate"
    }

    fn description() -> &'static str {
        "print the rewritten form of a line"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        let text = self.text.join(" ");
        writeln!(stdout, "{}", session.translator.translate(&text))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the tokens of a line, one per output line.
pub struct Tokens {
    #[argh(positional, greedy)]
    /// text to tokenize; words are joined by single spaces.
    pub text: Vec<String>,
}

impl BuiltinCommand for Tokens {
    fn name() -> &'static str {
        "tokens"
    }

    fn description() -> &'static str {
        "print the tokens of a line"
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode> {
        let text = self.text.join(" ");
        for token in lexer::tokens(&text) {
            writeln!(stdout, "{token}")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Translate and execute a script file as one unit.
pub struct Load {
    #[argh(positional)]
    /// path of the script file.
    pub path: PathBuf,
}

impl BuiltinCommand for Load {
    fn name() -> &'static str {
        "load"
    }

    fn description() -> &'static str {
        "run a script file"
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        let source = script::read_script(&self.path)?;
        session.execute(&source, stdout)
    }
}

#[derive(FromArgs)]
/// Leave the console.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn description() -> &'static str {
        "leave the console"
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        session.should_exit = true;
        Ok(0)
    }
}
