use crate::command::{CommandFactory, ExitCode};
use crate::completeness::{Completeness, check_completeness};
use crate::config::{Config, ConsoleConfig};
use crate::engine::ScriptEngine;
use crate::script;
use crate::session::Session;
use crate::translator::Translator;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, Editor};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports meta commands defined in this crate, see [`crate::builtin`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Accumulates physical lines until they form a submittable unit.
#[derive(Debug, Default)]
pub struct LineBuffer {
    text: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one physical line. Returns the buffered text once it is complete or
    /// can never become complete; returns `None` while more lines are needed.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        self.text.push_str(line);
        self.text.push('\n');
        match check_completeness(&self.text) {
            Completeness::Incomplete => None,
            Completeness::Complete => Some(std::mem::take(&mut self.text)),
            Completeness::Invalid(reason) => {
                debug!(reason = reason.as_str(), "submitting invalid input");
                Some(std::mem::take(&mut self.text))
            }
        }
    }

    /// Whether a partial statement is waiting for more lines.
    pub fn is_continuing(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Takes whatever is buffered, complete or not. Used at end of input, where no further
    /// lines can arrive.
    pub fn take_pending(&mut self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.text))
        }
    }
}

/// An interactive console that rewrites alias invocations and runs the result.
///
/// The console owns a [`Session`] and a list of [`CommandFactory`] objects that are
/// queried for `:`-prefixed meta commands. Everything else is translated and handed to
/// the session's [`ScriptEngine`].
///
/// Example
/// ```
/// use alias_console::{Console, EchoEngine, MemWriter, Translator};
/// let mut translator = Translator::new();
/// translator.add_aliased_command("pos");
/// let (out, handle) = MemWriter::with_handle();
/// let mut console =
///     Console::with_defaults(translator, Box::new(EchoEngine)).with_output(Box::new(out));
/// assert_eq!(console.submit("pos x 10").unwrap(), 0);
/// assert_eq!(MemWriter::contents(&handle), "pos(x, 10)\n");
/// ```
pub struct Console {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
    config: ConsoleConfig,
    stdout: Box<dyn Write>,
}

impl Console {
    /// Create a new console with a custom set of meta command factories.
    pub fn new(
        session: Session,
        commands: Vec<Box<dyn CommandFactory>>,
        config: ConsoleConfig,
    ) -> Self {
        Self {
            session,
            commands,
            config,
            stdout: Box::new(std::io::stdout()),
        }
    }

    /// Create a console with the default meta commands:
    /// `alias`, `aliases`, `translate`, `tokens`, `load`, `exit`.
    pub fn with_defaults(translator: Translator, engine: Box<dyn ScriptEngine>) -> Self {
        Self::new(
            Session::new(translator, engine),
            default_commands(),
            ConsoleConfig::default(),
        )
    }

    /// Create a console from a loaded configuration.
    pub fn from_config(config: &Config, engine: Box<dyn ScriptEngine>) -> Self {
        Self::new(
            Session::new(config.translator(), engine),
            default_commands(),
            config.console.clone(),
        )
    }

    /// Redirect everything the console prints.
    pub fn with_output(mut self, stdout: Box<dyn Write>) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Submit one complete unit of input.
    ///
    /// Blank input does nothing, `:name args` runs a meta command, and anything else is
    /// translated and executed by the engine.
    pub fn submit(&mut self, input: &str) -> anyhow::Result<ExitCode> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        if let Some(meta) = trimmed.strip_prefix(':') {
            return self.run_meta(meta);
        }
        debug!(input, "submitting");
        self.session.execute(input, &mut *self.stdout)
    }

    /// Translate and execute a whole script file as a single unit.
    pub fn run_script_file(&mut self, path: &Path) -> anyhow::Result<ExitCode> {
        info!(path = %path.display(), "running script");
        let source = script::read_script(path)?;
        self.session.execute(&source, &mut *self.stdout)
    }

    fn run_meta(&mut self, line: &str) -> anyhow::Result<ExitCode> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(0);
        };
        let args: Vec<&str> = parts.collect();
        debug!(command = name, ?args, "meta command");

        if name == "help" {
            for factory in &self.commands {
                writeln!(self.stdout, ":{:<12}{}", factory.name(), factory.description())?;
            }
            return Ok(0);
        }

        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(name, &args) {
                return cmd.execute(&mut *self.stdout, &mut self.session);
            }
        }
        Err(anyhow::anyhow!("unknown command: :{}", name))
    }

    /// Submits from the REPL, where failures are printed instead of ending the loop.
    fn submit_reporting(&mut self, input: &str) {
        match self.submit(input) {
            Ok(0) => {}
            Ok(code) => debug!(code, "command finished with non-zero status"),
            Err(err) => {
                warn!(%err, "submission failed");
                let _ = writeln!(self.stdout, "Error: {err:#}");
            }
        }
    }

    /// Interactive Read-Eval-Print Loop.
    ///
    /// Physical lines are collected until the completeness check accepts them; while a
    /// statement is open the continuation prompt is shown.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let rl_config = EditorConfig::builder()
            .max_history_size(self.config.history_size)?
            .history_ignore_space(true)
            .build();
        let mut rl: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

        if let Some(path) = self.config.history_file.as_deref().filter(|p| p.exists()) {
            if let Err(err) = rl.load_history(path) {
                warn!(path = %path.display(), %err, "failed to load history");
            }
        }

        let mut buffer = LineBuffer::new();
        while !self.session.should_exit {
            let prompt = if buffer.is_continuing() {
                &self.config.continuation_prompt
            } else {
                &self.config.prompt
            };

            match rl.readline(prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    let Some(input) = buffer.push_line(&line) else {
                        continue;
                    };
                    self.submit_reporting(&input);
                }
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    let _ = writeln!(self.stdout, "KeyboardInterrupt");
                }
                Err(ReadlineError::Eof) => {
                    if let Some(input) = buffer.take_pending() {
                        info!("end of input with an open statement, submitting it");
                        self.submit_reporting(&input);
                    }
                    break;
                }
                Err(err) => {
                    warn!(%err, "readline failed");
                    return Err(err);
                }
            }
        }

        if let Some(path) = &self.config.history_file {
            if let Err(err) = rl.save_history(path) {
                warn!(path = %path.display(), %err, "failed to save history");
            }
        }
        Ok(())
    }
}

fn default_commands() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    vec![
        Box::new(Factory::<Alias>::default()),
        Box::new(Factory::<Aliases>::default()),
        Box::new(Factory::<Translate>::default()),
        Box::new(Factory::<Tokens>::default()),
        Box::new(Factory::<Load>::default()),
        Box::new(Factory::<Exit>::default()),
    ]
}
