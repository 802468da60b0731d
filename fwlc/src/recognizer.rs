//! Acceptor for the fully parenthesized notation:
//!
//! ```text
//! Term ::= Var | "(" Term Term ")" | "(" OP Var "." Term ")"
//! ```
//!
//! The machine has five states. Alongside the state it keeps one counter per
//! open parenthesis holding how many subterms that parenthesis still expects
//! (two for an application, one for an abstraction body), so that the depth
//! is the length of that stack.

use tracing::trace;

use crate::{alphabet, prelude::*};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
    /// A subterm must start here: a variable or `(`.
    TermStart,
    /// Right after `(`: an operator, a variable or another `(`.
    Opened,
    /// Right after an operator: the binder.
    Binder,
    /// Right after the binder: the dot.
    Separator,
    /// A subterm just ended and its parenthesis expects nothing more.
    Closing,
}

/// Runs the machine over `input`, reporting the first rejected character.
/// On acceptance, returns the deepest parenthesis nesting seen.
pub fn check(input: &str) -> Result<usize> {
    let mut state = State::TermStart;
    let mut pending: Vec<u8> = vec![];
    let mut depth = 0;
    let mut offset = 0;
    for (i, c) in input.chars().enumerate() {
        offset = i + 1;
        let next = match (state, c) {
            (State::TermStart | State::Opened, c) if alphabet::is_variable(c) => {
                Some(term_completed(&mut pending))
            }
            (State::TermStart | State::Opened, alphabet::LPAREN) => {
                pending.push(2);
                depth = depth.max(pending.len());
                Some(State::Opened)
            }
            (State::Opened, c) if alphabet::is_operator(c) => {
                if let Some(top) = pending.last_mut() {
                    *top = 1;
                }
                Some(State::Binder)
            }
            (State::Binder, c) if alphabet::is_variable(c) => Some(State::Separator),
            (State::Separator, alphabet::DOT) => Some(State::TermStart),
            (State::Closing, alphabet::RPAREN) if !pending.is_empty() => {
                pending.pop();
                Some(term_completed(&mut pending))
            }
            _ => None,
        };
        match next {
            Some(next) => state = next,
            None => return Err(reject(i, Some(c))),
        }
    }
    if state == State::Closing && pending.is_empty() {
        Ok(depth)
    } else {
        Err(reject(offset, None))
    }
}

fn term_completed(pending: &mut [u8]) -> State {
    match pending.last_mut() {
        Some(top) => {
            *top -= 1;
            if *top == 0 {
                State::Closing
            } else {
                State::TermStart
            }
        }
        None => State::Closing,
    }
}

fn reject(offset: usize, found: Option<char>) -> Error {
    trace!(offset, ?found, "rejected lambda expression");
    Error::Malformed { offset, found }
}

pub fn recognize(input: &str) -> bool {
    check(input).is_ok()
}

/// Like [`recognize`], treating input that is not UTF-8 as not well formed.
pub fn recognize_bytes(input: &[u8]) -> bool {
    std::str::from_utf8(input).map_or(false, recognize)
}
