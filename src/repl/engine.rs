//! Session driver: startup, rc loading and the interactive loop.

use std::path::PathBuf;
use std::sync::Arc;

use reedline::{FileBackedHistory, Reedline, Signal};
use tracing::{debug, warn};

use crate::config::DisplayDefaults;
use crate::driver::{mongo, DatabaseHandle};
use crate::error::{Result, ScriptError, ShellError};
use crate::executor;
use crate::output::{OutputSink, StdoutSink};
use crate::parser::{self, Parser, Statement};
use crate::repl::prompt::{self, ShellPrompt};
use crate::repl::validator::StatementValidator;
use crate::session::display;
use crate::session::{SessionState, Value};

const HISTORY_FILE: &str = ".mongorsh_history";
const RC_FILE: &str = ".mongorshrc";
const HISTORY_CAPACITY: usize = 1000;

/// What the loop should do after a processed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// The interactive session driver.
///
/// Owns the session state for the lifetime of the process. `initializing`
/// is true only while the rc script runs; an error in that window aborts
/// startup, whereas interactive errors are reported and the loop goes on.
pub struct ShellEngine {
    state: SessionState,
    parser: Parser,
    initializing: bool,
}

impl ShellEngine {
    pub fn new(defaults: DisplayDefaults) -> Self {
        Self {
            state: SessionState::new(defaults),
            parser: Parser::new(),
            initializing: true,
        }
    }

    /// Connect to `url` and install the resulting database handle.
    ///
    /// Failure here is fatal to startup; the caller propagates it.
    pub async fn connect_startup(&mut self, url: &str, out: &mut dyn OutputSink) -> Result<()> {
        let database = Arc::new(mongo::connect(url).await?);
        let version = database.server_version().await?;
        out.print(&format!("Using MongoDB: {version}"));
        self.state.set_database(database);
        Ok(())
    }

    /// Run the per-user rc script through the normal evaluation path.
    ///
    /// Missing file is fine. Any failing statement, and a trailing
    /// statement left incomplete at end of file, abort startup: a broken
    /// startup environment is not worth limping on with.
    pub async fn load_rc(&mut self, out: &mut dyn OutputSink) -> Result<()> {
        let result = match rc_path() {
            Some(path) if path.exists() => self.run_script_file(&path, out).await,
            _ => Ok(()),
        };
        self.initializing = false;

        if result.is_err() {
            out.print(&format!("Error running {RC_FILE} file"));
        }
        result
    }

    async fn run_script_file(&mut self, path: &PathBuf, out: &mut dyn OutputSink) -> Result<()> {
        debug!(path = %path.display(), "loading rc script");
        let source = std::fs::read_to_string(path)?;
        self.run_script(&source, out).await
    }

    /// Evaluate a script, buffering lines into complete statements.
    ///
    /// While `initializing`, the first failing statement aborts the whole
    /// script; afterwards failures are reported and the script continues.
    pub async fn run_script(&mut self, source: &str, out: &mut dyn OutputSink) -> Result<()> {
        let mut buffer = String::new();

        for line in source.lines() {
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(line);

            if !parser::is_complete(&buffer) {
                continue;
            }

            let statement = std::mem::take(&mut buffer);
            if let Err(err) = self.eval_and_display(&statement, out).await {
                self.report_error(&err, out);
                if self.initializing {
                    return Err(ScriptError::StatementFailed(err.to_string()).into());
                }
            }
        }

        if !buffer.trim().is_empty() {
            let err: ShellError = ScriptError::IncompleteStatement.into();
            self.report_error(&err, out);
            if self.initializing {
                return Err(err);
            }
        }

        Ok(())
    }

    /// Parse, evaluate and render one statement.
    async fn eval_and_display(
        &mut self,
        input: &str,
        out: &mut dyn OutputSink,
    ) -> Result<LoopControl> {
        let statement = self.parser.parse(input)?;

        if statement == Statement::Exit {
            return Ok(LoopControl::Exit);
        }

        let value = executor::evaluate(&mut self.state, statement, out).await?;
        display::handle_result(&mut self.state, value, out).await?;
        Ok(LoopControl::Continue)
    }

    /// Process one interactive line; errors are reported, never fatal.
    pub async fn process_line(&mut self, input: &str, out: &mut dyn OutputSink) -> LoopControl {
        match self.eval_and_display(input, out).await {
            Ok(control) => control,
            Err(err) => {
                self.report_error(&err, out);
                LoopControl::Continue
            }
        }
    }

    /// Capture the error into the session and render a report.
    fn report_error(&mut self, err: &ShellError, out: &mut dyn OutputSink) {
        self.state
            .set("last_error", Value::String(err.to_string()));
        self.state.set(
            "last_traceback",
            Value::String(format!("at <shell>: {err}")),
        );
        out.print_error(&format!("Error: {err}"));
    }

    /// The interactive read-eval-print loop.
    ///
    /// The prompt is recomputed from the live topology after every
    /// statement. Ctrl-C clears the line, Ctrl-D leaves the shell.
    pub async fn run(&mut self) -> Result<()> {
        let mut out = StdoutSink::new();
        let mut editor = build_editor()?;
        let mut shell_prompt =
            ShellPrompt::new(prompt::compute_prompt(self.state.database().as_ref()).await);

        loop {
            match editor.read_line(&shell_prompt) {
                Ok(Signal::Success(line)) => {
                    if self.process_line(&line, &mut out).await == LoopControl::Exit {
                        break;
                    }
                    shell_prompt
                        .set_text(prompt::compute_prompt(self.state.database().as_ref()).await);
                }
                Ok(Signal::CtrlC) => continue,
                Ok(Signal::CtrlD) => break,
                Err(err) => {
                    warn!(error = %err, "read error");
                    return Err(ShellError::Generic(format!("Read error: {err}")));
                }
            }
        }

        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }
}

fn build_editor() -> Result<Reedline> {
    let mut editor = Reedline::create().with_validator(Box::new(StatementValidator::new()));

    if let Some(home) = dirs::home_dir() {
        match FileBackedHistory::with_file(HISTORY_CAPACITY, home.join(HISTORY_FILE)) {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(err) => warn!(error = %err, "history file unavailable"),
        }
    }

    Ok(editor)
}

fn rc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(RC_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    fn engine() -> ShellEngine {
        ShellEngine::new(DisplayDefaults::default())
    }

    #[test]
    fn test_exit_statement_stops_the_loop() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            assert_eq!(engine.process_line("exit", &mut out).await, LoopControl::Exit);
            assert_eq!(engine.process_line("quit", &mut out).await, LoopControl::Exit);
        });
    }

    #[test]
    fn test_interactive_errors_do_not_stop_the_loop() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            let control = engine.process_line("no_such_name", &mut out).await;
            assert_eq!(control, LoopControl::Continue);
            assert!(out.contents().contains("no_such_name"));
            assert!(matches!(
                engine.state().get("last_error"),
                Some(Value::String(_))
            ));
            assert!(matches!(
                engine.state().get("last_traceback"),
                Some(Value::String(_))
            ));
        });
    }

    #[test]
    fn test_script_statements_share_the_session() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            engine
                .run_script("MAX_PAGE_SIZE = 3\nx = 'hello'\nx\n", &mut out)
                .await
                .unwrap();
            assert_eq!(engine.state().max_page_size(), 3);
            assert!(out.contents().contains("'hello'"));
        });
    }

    #[test]
    fn test_script_buffers_multiline_statements() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            // The assignment spans three lines; it only evaluates once
            // the braces balance.
            engine
                .run_script("conf = {\n  a: 1\n}\nconf\n", &mut out)
                .await
                .unwrap();
            assert!(out.contents().contains("a: 1"));
        });
    }

    #[test]
    fn test_script_failure_aborts() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            let err = engine
                .run_script("x = 1\nno_such_name\nx = 2\n", &mut out)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("no_such_name"));
            // The statement after the failure never ran.
            assert!(matches!(engine.state().get("x"), Some(Value::Int(1))));
        });
    }

    #[test]
    fn test_fresh_engine_starts_unconnected_with_bare_prompt() {
        tokio_test::block_on(async {
            let engine = engine();
            assert!(engine.state().database().is_none());
            let prompt = prompt::compute_prompt(engine.state().database().as_ref()).await;
            assert_eq!(prompt, "> ");
        });
    }

    #[test]
    fn test_trailing_incomplete_statement_aborts() {
        tokio_test::block_on(async {
            let mut engine = engine();
            let mut out = MemorySink::new();
            let err = engine
                .run_script("x = 1\nconf = {\n  a: 1\n", &mut out)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ShellError::Script(ScriptError::IncompleteStatement)
            ));
        });
    }
}
