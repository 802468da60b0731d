//! An evaluator for the untyped lambda calculus written in a fully
//! parenthesized notation such as `((λx.(xx))((λz.(tz))r))`, where `/` may be
//! typed in place of `λ`.
//!
//! ```
//! use fwlc::{build, reduce_with_trace, Limits, Order};
//!
//! let term = build("((/x.(xx))((/z.(tz))r))").unwrap();
//! let trace = reduce_with_trace(&term, Order::Applicative, Limits::default()).unwrap();
//! let trace: Vec<_> = trace.iter().map(ToString::to_string).collect();
//! assert_eq!(trace, ["((λx.(xx))((λz.(tz))r))", "((λx.(xx))(tr))", "((tr)(tr))"]);
//! ```

use std::collections::BTreeSet;

pub mod alphabet;
pub mod evaluator;
pub mod parser;
pub mod prelude;
pub mod recognizer;
pub mod term;

pub use evaluator::{evaluate, step, steps, Limited, Limits, Order, Steps};
pub use parser::build;
pub use prelude::{Error, Name, Result};
pub use recognizer::{check, recognize, recognize_bytes};
pub use term::{Term, TermRef};

pub fn render(term: &Term) -> String {
    term.to_string()
}

pub fn free_variables(term: &Term) -> BTreeSet<Name> {
    term.free_variables()
}

pub fn is_normal_form(term: &Term) -> bool {
    term.is_normal_form()
}

pub fn reduce_with_trace(term: &Term, order: Order, limits: Limits) -> Result<Vec<Term>> {
    evaluator::trace(term, order, limits)
}
