use std::path::Path;

use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    EvalError(E),
}

/// What the driver should do after a line has been evaluated.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Flow {
    Continue,
    Quit,
}

pub trait Repl {
    type Error: std::fmt::Debug;
    fn prompt(&self) -> &str {
        ">> "
    }
    fn history(&self) -> Option<&Path> {
        None
    }
    fn evaluate(&mut self, input: String) -> Result<Flow, Self::Error>;
}

/// Joins a line ending with `\` to the next one.
/// Returns the complete input once a line without continuation is seen.
fn continue_line(pending: &mut Option<String>, mut line: String) -> Option<String> {
    if line.ends_with('\\') {
        line.pop();
        line.push('\n');
        match pending.as_mut() {
            Some(input) => input.push_str(line.as_str()),
            None => *pending = Some(line),
        }
        return None;
    }
    Some(match pending.take() {
        Some(mut input) => {
            input.push_str(line.as_str());
            input
        }
        None => line,
    })
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = repl.history() {
        editor.load_history(history).ok();
    }
    let mut pending: Option<String> = None;
    loop {
        let prompt = repl.prompt().to_string();
        match editor.readline(&prompt) {
            Ok(line) => {
                let input = match continue_line(&mut pending, line) {
                    Some(input) => input,
                    None => continue,
                };
                editor.add_history_entry(input.as_str());
                let flow = repl.evaluate(input).map_err(Error::EvalError)?;
                if let Some(history) = repl.history() {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
                if flow == Flow::Quit {
                    break Ok(());
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Goodbye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_continue_line() {
        let mut pending = None;
        assert_eq!(continue_line(&mut pending, "A = \\".to_string()), None);
        assert_eq!(pending.as_deref(), Some("A = \n"));
        assert_eq!(
            continue_line(&mut pending, "(xy)".to_string()),
            Some("A = \n(xy)".to_string())
        );
        assert_eq!(pending, None);
        assert_eq!(
            continue_line(&mut pending, "x".to_string()),
            Some("x".to_string())
        );
    }
}
