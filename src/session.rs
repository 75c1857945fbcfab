use crate::command::ExitCode;
use crate::engine::ScriptEngine;
use crate::translator::Translator;
use anyhow::Result;
use std::io::Write;
use tracing::debug;

/// Mutable state of one console session.
///
/// The session contains:
/// - `translator`: the alias table and rewriting pass applied to every submission.
/// - `engine`: the interpreter that receives the rewritten code.
/// - `should_exit`: a flag that the REPL loop checks to know when to terminate.
pub struct Session {
    pub translator: Translator,
    pub engine: Box<dyn ScriptEngine>,
    pub should_exit: bool,
}

impl Session {
    pub fn new(translator: Translator, engine: Box<dyn ScriptEngine>) -> Self {
        Self {
            translator,
            engine,
            should_exit: false,
        }
    }

    /// Translate `source` and hand the result to the engine.
    pub fn execute(&mut self, source: &str, stdout: &mut dyn Write) -> Result<ExitCode> {
        let code = self.translator.translate(source);
        debug!(bytes = code.len(), "executing translated code");
        self.engine.execute(&code, stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EchoEngine;

    #[test]
    fn test_session_translates_before_executing() {
        let mut translator = Translator::new();
        translator.add_aliased_command("pos");
        let mut session = Session::new(translator, Box::new(EchoEngine));

        let mut out = Vec::new();
        let code = session.execute("pos x 10", &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "pos(x, 10)\n");
        assert!(!session.should_exit);
    }
}
