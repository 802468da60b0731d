use std::{collections::BTreeSet, rc::Rc};

use crate::{alphabet, prelude::*};

pub type TermRef = Rc<Term>;

/// A lambda term.
///
/// Terms are immutable: every transformation below builds a new term and
/// shares the untouched subterms with the original.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Term {
    /// `x`
    Variable(Name),
    /// `(t t)`
    Apply(TermRef, TermRef),
    /// `(λx.t)`
    Abstract(Name, TermRef),
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(x) => f.write_fmt(format_args!("{x}")),
            Term::Apply(lhs, rhs) => f.write_fmt(format_args!("({lhs}{rhs})")),
            Term::Abstract(x, body) => {
                f.write_fmt(format_args!("({}{x}.{body})", alphabet::LAMBDA))
            }
        }
    }
}

impl Term {
    pub fn variable(name: char) -> Result<Self> {
        Ok(Term::Variable(Name::new(name)?))
    }

    pub fn lambda(binder: char, body: impl Into<TermRef>) -> Result<Self> {
        Ok(Term::Abstract(Name::new(binder)?, body.into()))
    }

    pub fn apply(lhs: impl Into<TermRef>, rhs: impl Into<TermRef>) -> Self {
        Term::Apply(lhs.into(), rhs.into())
    }

    /// `(function self)`: `self` becomes the argument of `function`.
    pub fn apply_to(self, function: Term) -> Self {
        Term::apply(function, self)
    }

    /// `(λbinder.self)`
    pub fn abstract_over(self, binder: char) -> Result<Self> {
        Term::lambda(binder, self)
    }

    pub fn free_variables(&self) -> BTreeSet<Name> {
        match self {
            Term::Variable(x) => BTreeSet::from([*x]),
            Term::Apply(lhs, rhs) => {
                let mut vars = lhs.free_variables();
                vars.extend(rhs.free_variables());
                vars
            }
            Term::Abstract(x, body) => {
                let mut vars = body.free_variables();
                vars.remove(x);
                vars
            }
        }
    }

    /// Every name used as a binder somewhere in the term.
    pub fn bound_variables(&self) -> BTreeSet<Name> {
        match self {
            Term::Variable(_) => BTreeSet::new(),
            Term::Apply(lhs, rhs) => {
                let mut vars = lhs.bound_variables();
                vars.extend(rhs.bound_variables());
                vars
            }
            Term::Abstract(x, body) => {
                let mut vars = body.bound_variables();
                vars.insert(*x);
                vars
            }
        }
    }

    pub fn is_combinator(&self) -> bool {
        self.free_variables().is_empty()
    }

    /// Replaces every occurrence of `old`, bound or free and binders included,
    /// with `new`.
    ///
    /// Nothing is done to avoid capture: picking a fresh `new` is up to the
    /// caller.
    pub fn rename(&self, old: char, new: char) -> Result<Term> {
        fn rename_rec(term: &Term, old: char, new: Name) -> Term {
            match term {
                Term::Variable(x) if x.as_char() == old => Term::Variable(new),
                Term::Variable(_) => term.clone(),
                Term::Apply(lhs, rhs) => Term::Apply(
                    rename_rec(lhs, old, new).into(),
                    rename_rec(rhs, old, new).into(),
                ),
                Term::Abstract(x, body) => {
                    let binder = if x.as_char() == old { new } else { *x };
                    Term::Abstract(binder, rename_rec(body, old, new).into())
                }
            }
        }
        Ok(rename_rec(self, old, Name::new(new)?))
    }

    /// Replaces the free occurrences of `name` with `replacement`.
    ///
    /// Binders are never renamed, so a free variable of `replacement` can end
    /// up captured by an abstraction of `self`.
    pub fn substitute(&self, name: Name, replacement: &Term) -> Term {
        match self {
            Term::Variable(x) if *x == name => replacement.clone(),
            Term::Variable(_) => self.clone(),
            Term::Apply(lhs, rhs) => Term::Apply(
                lhs.substitute(name, replacement).into(),
                rhs.substitute(name, replacement).into(),
            ),
            Term::Abstract(x, _) if *x == name => self.clone(),
            Term::Abstract(x, body) => {
                Term::Abstract(*x, body.substitute(name, replacement).into())
            }
        }
    }

    pub fn is_redex(&self) -> bool {
        matches!(self, Term::Apply(lhs, _) if matches!(lhs.as_ref(), Term::Abstract(_, _)))
    }

    pub fn is_normal_form(&self) -> bool {
        match self {
            Term::Variable(_) => true,
            Term::Abstract(_, body) => body.is_normal_form(),
            Term::Apply(lhs, rhs) => {
                !self.is_redex() && lhs.is_normal_form() && rhs.is_normal_form()
            }
        }
    }

    /// Contracts the redex `((λx.body) arg)` into `body[x := arg]`.
    pub fn beta_reduce(&self) -> Result<Term> {
        if let Term::Apply(lhs, rhs) = self {
            if let Term::Abstract(x, body) = lhs.as_ref() {
                return Ok(body.substitute(*x, rhs));
            }
        }
        Err(Error::NotARedex(self.clone()))
    }

    /// `(λx.(f x))` to `f` when `x` is not free in `f`.
    pub fn eta_reduce(&self) -> Option<Term> {
        if let Term::Abstract(x, body) = self {
            if let Term::Apply(lhs, rhs) = body.as_ref() {
                if rhs.as_ref() == &Term::Variable(*x) && !lhs.free_variables().contains(x) {
                    return Some(lhs.as_ref().clone());
                }
            }
        }
        None
    }

    /// Equality up to the names of bound variables.
    pub fn alpha_equivalent(&self, other: &Term) -> bool {
        anonymize(self) == anonymize(other)
    }
}

/// A term with bound variables replaced by de Bruijn indices.
#[derive(PartialEq, Eq, Debug)]
enum Nameless {
    Bound(usize),
    Free(Name),
    Abstract(Box<Nameless>),
    Apply(Box<Nameless>, Box<Nameless>),
}

fn anonymize(term: &Term) -> Nameless {
    fn anonymize_rec(table: &mut Vec<Name>, term: &Term) -> Nameless {
        match term {
            Term::Variable(x) => table
                .iter()
                .rev()
                .position(|y| y == x)
                .map_or(Nameless::Free(*x), Nameless::Bound),
            Term::Abstract(x, body) => {
                table.push(*x);
                let body = anonymize_rec(table, body);
                assert_eq!(Some(*x), table.pop());
                Nameless::Abstract(body.into())
            }
            Term::Apply(lhs, rhs) => {
                let lhs = anonymize_rec(table, lhs);
                let rhs = anonymize_rec(table, rhs);
                Nameless::Apply(lhs.into(), rhs.into())
            }
        }
    }
    anonymize_rec(&mut vec![], term)
}
