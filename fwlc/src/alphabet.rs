//! The fixed symbol set of the notation.
//!
//! Variables are single lowercase ASCII letters. The abstraction operator is
//! rendered as `λ`, and `/` is accepted on input as its ASCII spelling.

pub const LAMBDA: char = 'λ';
pub const ASCII_LAMBDA: char = '/';
pub const OPERATORS: [char; 2] = [LAMBDA, ASCII_LAMBDA];
pub const DOT: char = '.';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';

pub fn is_variable(c: char) -> bool {
    c.is_ascii_lowercase()
}

pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// Membership in the union of every symbol above.
pub fn contains(c: char) -> bool {
    is_variable(c) || is_operator(c) || matches!(c, DOT | LPAREN | RPAREN)
}

pub fn variables() -> impl Iterator<Item = char> + Clone {
    'a'..='z'
}

pub fn symbols() -> impl Iterator<Item = char> {
    variables().chain(OPERATORS).chain([DOT, LPAREN, RPAREN])
}
