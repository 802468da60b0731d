use tracing::debug;

use crate::{prelude::*, term::Term};

/// Which redex a reduction step contracts.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, derive_more::Display, Debug)]
pub enum Order {
    /// Outermost, leftmost redex first.
    #[default]
    #[display(fmt = "normal")]
    Normal,
    /// Innermost redex first, arguments before functions.
    #[display(fmt = "applicative")]
    Applicative,
}

impl std::str::FromStr for Order {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" | "NO" => Ok(Order::Normal),
            "applicative" | "AO" => Ok(Order::Applicative),
            _ => Err(format!("Unknown evaluation order `{s}`")),
        }
    }
}

/// Bounds on a reduction. With no bound a term without normal form keeps
/// reducing forever.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct Limits {
    pub max_steps: Option<usize>,
}

fn reduce_normal(term: &Term) -> Option<Term> {
    match term {
        Term::Variable(_) => None,
        Term::Abstract(x, body) => Some(Term::Abstract(*x, reduce_normal(body)?.into())),
        Term::Apply(lhs, rhs) => {
            if let Term::Abstract(x, body) = lhs.as_ref() {
                return Some(body.substitute(*x, rhs));
            }
            if let Some(lhs) = reduce_normal(lhs) {
                return Some(Term::Apply(lhs.into(), rhs.clone()));
            }
            let rhs = reduce_normal(rhs)?;
            Some(Term::Apply(lhs.clone(), rhs.into()))
        }
    }
}

fn reduce_applicative(term: &Term) -> Option<Term> {
    match term {
        Term::Variable(_) => None,
        Term::Abstract(x, body) => Some(Term::Abstract(*x, reduce_applicative(body)?.into())),
        Term::Apply(lhs, rhs) => {
            if let Some(rhs) = reduce_applicative(rhs) {
                return Some(Term::Apply(lhs.clone(), rhs.into()));
            }
            if let Some(lhs) = reduce_applicative(lhs) {
                return Some(Term::Apply(lhs.into(), rhs.clone()));
            }
            if let Term::Abstract(x, body) = lhs.as_ref() {
                return Some(body.substitute(*x, rhs));
            }
            None
        }
    }
}

/// One reduction step, or `None` when `term` is in normal form.
pub fn reduce(term: &Term, order: Order) -> Option<Term> {
    match order {
        Order::Normal => reduce_normal(term),
        Order::Applicative => reduce_applicative(term),
    }
}

/// One reduction step; reducing a term already in normal form is an error.
pub fn step(term: &Term, order: Order) -> Result<Term> {
    reduce(term, order).ok_or_else(|| Error::AlreadyNormal(term.clone()))
}

/// The reduction sequence of a term: the term itself, then every term it
/// steps to, ending with its normal form if there is one.
#[derive(Clone, Debug)]
pub struct Steps {
    next: Option<Term>,
    order: Order,
    count: usize,
}

impl Iterator for Steps {
    type Item = Term;
    fn next(&mut self) -> Option<Term> {
        let current = self.next.take()?;
        self.next = reduce(&current, self.order);
        if let Some(next) = &self.next {
            self.count += 1;
            debug!(step = self.count, order = %self.order, "{next}");
        }
        Some(current)
    }
}

impl Steps {
    /// Stops the sequence with [`Error::StepLimitExceeded`] once it would go
    /// past `limits.max_steps` steps.
    pub fn limited(self, limits: Limits) -> Limited {
        Limited {
            steps: self,
            limits,
            yielded: 0,
            exceeded: false,
        }
    }
}

pub fn steps(term: &Term, order: Order) -> Steps {
    Steps {
        next: Some(term.clone()),
        order,
        count: 0,
    }
}

/// A reduction sequence under a step budget: `n` allowed steps yield at most
/// `n + 1` terms, then one error.
#[derive(Clone, Debug)]
pub struct Limited {
    steps: Steps,
    limits: Limits,
    yielded: usize,
    exceeded: bool,
}

impl Iterator for Limited {
    type Item = Result<Term>;
    fn next(&mut self) -> Option<Result<Term>> {
        if self.exceeded {
            return None;
        }
        let term = self.steps.next()?;
        if let Some(max_steps) = self.limits.max_steps {
            if self.yielded > max_steps {
                self.exceeded = true;
                return Some(Err(Error::StepLimitExceeded(max_steps)));
            }
        }
        self.yielded += 1;
        Some(Ok(term))
    }
}

/// Collects the whole reduction sequence of `term`.
///
/// Fails with [`Error::StepLimitExceeded`] when the normal form is not
/// reached within `limits.max_steps` steps.
pub fn trace(term: &Term, order: Order, limits: Limits) -> Result<Vec<Term>> {
    steps(term, order).limited(limits).collect()
}

/// Reduces `term` to its normal form.
pub fn evaluate(term: &Term, order: Order, limits: Limits) -> Result<Term> {
    steps(term, order)
        .limited(limits)
        .last()
        .unwrap_or_else(|| Ok(term.clone()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::build;

    fn run(input: &str, order: Order) -> Vec<String> {
        trace(&build(input).unwrap(), order, Limits::default())
            .unwrap()
            .iter()
            .map(Term::to_string)
            .collect()
    }

    const OMEGA: &str = "((λx.(xx))(λx.(xx)))";

    #[test]
    fn test_normal_order() {
        assert_eq!(
            run("((/x.(xx))((/z.(tz))r))", Order::Normal),
            vec![
                "((λx.(xx))((λz.(tz))r))",
                "(((λz.(tz))r)((λz.(tz))r))",
                "((tr)((λz.(tz))r))",
                "((tr)(tr))",
            ]
        );
    }

    #[test]
    fn test_applicative_order() {
        assert_eq!(
            run("((/x.(xx))((/z.(tz))r))", Order::Applicative),
            vec![
                "((λx.(xx))((λz.(tz))r))",
                "((λx.(xx))(tr))",
                "((tr)(tr))",
            ]
        );
    }

    #[test]
    fn test_normal_form_is_fixed_point() {
        for input in ["x", "(xy)", "(λx.x)", "(λx.(y(λz.z)))"] {
            let term = build(input).unwrap();
            for order in [Order::Normal, Order::Applicative] {
                assert_eq!(trace(&term, order, Limits::default()).unwrap(), vec![term.clone()]);
                assert_eq!(step(&term, order), Err(Error::AlreadyNormal(term.clone())));
            }
        }
    }

    #[test]
    fn test_reduce_under_abstraction() {
        assert_eq!(run("(λy.((λx.x)y))", Order::Normal), vec!["(λy.((λx.x)y))", "(λy.y)"]);
        assert_eq!(
            run("(λy.((λx.x)y))", Order::Applicative),
            vec!["(λy.((λx.x)y))", "(λy.y)"]
        );
    }

    #[test]
    fn test_orders_differ_on_discarded_divergence() {
        let input = format!("((λx.y){OMEGA})");
        let term = build(&input).unwrap();
        assert_eq!(
            evaluate(&term, Order::Normal, Limits::default()).unwrap(),
            build("y").unwrap()
        );
        let limits = Limits {
            max_steps: Some(10),
        };
        assert_eq!(
            evaluate(&term, Order::Applicative, limits),
            Err(Error::StepLimitExceeded(10))
        );
        assert_eq!(
            trace(&term, Order::Applicative, limits),
            Err(Error::StepLimitExceeded(10))
        );
    }

    #[test]
    fn test_step_limit() {
        let term = build("((/x.(xx))((/z.(tz))r))").unwrap();
        let exact = Limits { max_steps: Some(3) };
        assert_eq!(trace(&term, Order::Normal, exact).unwrap().len(), 4);
        let short = Limits { max_steps: Some(2) };
        assert_eq!(trace(&term, Order::Normal, short), Err(Error::StepLimitExceeded(2)));
        assert_eq!(evaluate(&term, Order::Normal, short), Err(Error::StepLimitExceeded(2)));
        assert_eq!(
            evaluate(&term, Order::Applicative, short).unwrap().to_string(),
            "((tr)(tr))"
        );
        let none = Limits { max_steps: Some(0) };
        let x = build("x").unwrap();
        assert_eq!(trace(&x, Order::Normal, none).unwrap(), vec![x]);
    }

    #[test]
    fn test_limited() {
        let term = build("((/x.(xx))((/z.(tz))r))").unwrap();
        let limited = steps(&term, Order::Normal)
            .limited(Limits { max_steps: Some(1) })
            .map(|r| r.map(|t| t.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            limited,
            vec![
                Ok("((λx.(xx))((λz.(tz))r))".to_string()),
                Ok("(((λz.(tz))r)((λz.(tz))r))".to_string()),
                Err(Error::StepLimitExceeded(1)),
            ]
        );
        let unbounded = steps(&term, Order::Normal).limited(Limits::default());
        assert_eq!(unbounded.filter(Result::is_ok).count(), 4);

        let omega = build(OMEGA).unwrap();
        let mut limited = steps(&omega, Order::Normal).limited(Limits { max_steps: Some(0) });
        assert_eq!(limited.next(), Some(Ok(omega)));
        assert_eq!(limited.next(), Some(Err(Error::StepLimitExceeded(0))));
        assert_eq!(limited.next(), None);
    }

    #[test]
    fn test_steps_is_lazy() {
        let omega = build(OMEGA).unwrap();
        let prefix = steps(&omega, Order::Normal).take(5).collect::<Vec<_>>();
        assert_eq!(prefix.len(), 5);
        assert!(prefix.iter().all(|t| t == &omega));
    }

    #[test]
    fn test_step() {
        let term = build("((/x.x)((/y.y)z))").unwrap();
        assert_eq!(step(&term, Order::Normal).unwrap().to_string(), "((λy.y)z)");
        assert_eq!(step(&term, Order::Applicative).unwrap().to_string(), "((λx.x)z)");
    }

    #[test]
    fn test_church_numerals() {
        // succ 1 = 2
        let succ = "(λn.(λf.(λx.(f((nf)x)))))";
        let one = "(λf.(λx.(fx)))";
        let term = build(&format!("({succ}{one})")).unwrap();
        let two = build("(λf.(λx.(f(fx))))").unwrap();
        for order in [Order::Normal, Order::Applicative] {
            assert_eq!(evaluate(&term, order, Limits::default()).unwrap(), two);
        }
    }

    #[test]
    fn test_order_from_str() {
        assert_eq!("normal".parse::<Order>(), Ok(Order::Normal));
        assert_eq!("applicative".parse::<Order>(), Ok(Order::Applicative));
        assert!("lazy".parse::<Order>().is_err());
        assert_eq!(Order::Applicative.to_string(), "applicative");
    }
}
