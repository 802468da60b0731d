use thiserror::Error;

use crate::{alphabet, term::Term};

/// A variable name: one character of the variable alphabet.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, derive_more::Display, Debug)]
#[display(fmt = "{_0}")]
pub struct Name(char);
impl Name {
    pub fn new(c: char) -> Result<Self> {
        if alphabet::is_variable(c) {
            Ok(Self(c))
        } else {
            Err(Error::InvalidIdentifier(c))
        }
    }
    pub fn as_char(self) -> char {
        self.0
    }
}
impl TryFrom<char> for Name {
    type Error = Error;
    fn try_from(c: char) -> Result<Self> {
        Self::new(c)
    }
}

#[derive(PartialEq, Eq, Clone, Error, Debug)]
pub enum Error {
    #[error("Badly formed lambda expression: unexpected {} at offset {offset}", describe(.found))]
    Malformed { offset: usize, found: Option<char> },
    #[error("Lambda expression nested {depth} deep, the limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
    #[error("`{0}` is not the name of a lambda variable")]
    InvalidIdentifier(char),
    #[error("`{0}` is not a redex")]
    NotARedex(Term),
    #[error("`{0}` is already in its beta normal form")]
    AlreadyNormal(Term),
    #[error("No normal form reached within {0} steps")]
    StepLimitExceeded(usize),
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("`{c}`"),
        None => "end of the input".to_string(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
