use chumsky::prelude::*;

use crate::{alphabet, prelude::*, recognizer, term::Term};

/// Deepest parenthesis nesting [`build`] accepts. Every operation on terms
/// recurses once per level.
pub const MAX_DEPTH: usize = 1000;

pub trait SimpleParser<O>: Parser<char, O, Error = Simple<char>> + Clone {}
impl<O, T> SimpleParser<O> for T where T: Parser<char, O, Error = Simple<char>> + Clone {}

/// Every symbol of the notation is one character, so the index of a token is
/// also its offset in the input.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Token {
    LParen,
    RParen,
    /// `λ` or `/`
    Lambda,
    Dot,
    Variable(Name),
}

fn name() -> impl SimpleParser<Name> {
    filter(|c: &char| alphabet::is_variable(*c))
        .try_map(|c, span| Name::new(c).map_err(|e| Simple::custom(span, e)))
        .labelled("variable")
}

pub fn lexer() -> impl SimpleParser<Vec<Token>> {
    choice((
        just(alphabet::LPAREN).to(Token::LParen),
        just(alphabet::RPAREN).to(Token::RParen),
        just(alphabet::DOT).to(Token::Dot),
        filter(|c: &char| alphabet::is_operator(*c)).to(Token::Lambda),
        name().map(Token::Variable),
    ))
    .repeated()
    .then_ignore(end())
}

/// A parenthesis whose term is not complete yet.
enum Frame {
    /// `(`
    Open,
    /// `(λ`
    Lambda,
    /// `(λx.`
    Body(Name),
    /// `(t`
    Lhs(Term),
    /// `(t t` or `(λx.t`
    Complete(Term),
}

fn attach(stack: &mut Vec<Frame>, term: Term) -> Result<Option<Term>, Term> {
    match stack.pop() {
        None => return Ok(Some(term)),
        Some(Frame::Open) => stack.push(Frame::Lhs(term)),
        Some(Frame::Lhs(lhs)) => stack.push(Frame::Complete(Term::apply(lhs, term))),
        Some(Frame::Body(x)) => stack.push(Frame::Complete(Term::Abstract(x, term.into()))),
        Some(Frame::Lambda | Frame::Complete(_)) => return Err(term),
    }
    Ok(None)
}

/// Assembles the tokens of an accepted input with an explicit stack, so the
/// depth of the term costs heap rather than call stack.
fn assemble(input: &str, tokens: Vec<Token>) -> Result<Term> {
    let mut stack: Vec<Frame> = vec![];
    let mut root = None;
    for (offset, token) in tokens.into_iter().enumerate() {
        let unexpected = || Error::Malformed {
            offset,
            found: input.chars().nth(offset),
        };
        if root.is_some() {
            return Err(unexpected());
        }
        let term = match (token, stack.pop()) {
            (Token::LParen, top) => {
                stack.extend(top);
                stack.push(Frame::Open);
                continue;
            }
            (Token::Lambda, Some(Frame::Open)) => {
                stack.push(Frame::Lambda);
                continue;
            }
            (Token::Variable(x), Some(Frame::Lambda)) => {
                stack.push(Frame::Body(x));
                continue;
            }
            (Token::Dot, Some(frame @ Frame::Body(_))) => {
                stack.push(frame);
                continue;
            }
            (Token::Variable(x), top) => {
                stack.extend(top);
                Term::Variable(x)
            }
            (Token::RParen, Some(Frame::Complete(term))) => term,
            _ => return Err(unexpected()),
        };
        root = attach(&mut stack, term).map_err(|_| unexpected())?;
    }
    match root {
        Some(term) if stack.is_empty() => Ok(term),
        _ => Err(Error::Malformed {
            offset: input.chars().count(),
            found: None,
        }),
    }
}

/// Builds the term written in `input`.
///
/// The input goes through the recognizer first, so no tree is ever built from
/// text outside the language.
pub fn build(input: &str) -> Result<Term> {
    let depth = recognizer::check(input)?;
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep {
            depth,
            limit: MAX_DEPTH,
        });
    }
    let tokens = lexer().parse(input).map_err(|es| {
        let e = es.into_iter().next();
        Error::Malformed {
            offset: e.as_ref().map_or(0, |e| e.span().start),
            found: e.and_then(|e| e.found().copied()),
        }
    })?;
    assemble(input, tokens)
}
