use std::path::{Path, PathBuf};

use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::Parser;
use fwlc::{Error, Limits, Order, Term};
use rpds::HashTrieMap;
use tracing_subscriber::EnvFilter;
use util::repl::{self, Flow};

/// Fun with lambda calculus: bind lambda expressions to names and watch
/// them reduce.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Give up on a reduction after this many steps.
    #[arg(long)]
    max_steps: Option<usize>,
    /// Where the line history is kept.
    #[arg(long, default_value = "/tmp/fwlc.history")]
    history: PathBuf,
    /// Do not read or write the history file.
    #[arg(long)]
    no_history: bool,
}

#[derive(PartialEq, Eq, Debug)]
enum Command<'a> {
    Empty,
    Quit,
    Help,
    /// `X = (λx.x)`
    Bind(&'a str, &'a str),
    /// `X`
    Show(&'a str),
    /// `:NOBeval X`, `:AOBeval X`
    Eval(Order, &'a str),
    /// `:info X`
    Info(&'a str),
    /// `(λx.x)`
    Term(&'a str),
    Unknown(&'a str),
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase())
}

fn parse_command(input: &str) -> Command<'_> {
    let words = input.split_whitespace().collect::<Vec<_>>();
    match words.as_slice() {
        [] => Command::Empty,
        [":q" | ":quit"] => Command::Quit,
        [":h" | ":help"] => Command::Help,
        [":NOBeval", id] => Command::Eval(Order::Normal, id),
        [":AOBeval", id] => Command::Eval(Order::Applicative, id),
        [":info", id] => Command::Info(id),
        [id, "=", term] => Command::Bind(id, term),
        [word] if word.starts_with(':') => Command::Unknown(word),
        [word] if is_identifier(word) => Command::Show(word),
        [word] => Command::Term(word),
        _ => Command::Unknown(input.trim()),
    }
}

fn build_report(offset: usize, found: Option<char>) -> Report {
    let found = found.map_or("end of the input".to_string(), |c| c.to_string());
    Report::build(ReportKind::Error, (), offset)
        .with_message(format!("Badly formed lambda expression, unexpected {found}"))
        .with_label(
            Label::new(offset..offset + 1)
                .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                .with_color(Color::Red),
        )
        .finish()
}

/// What `:info` prints about a term.
fn describe(term: &Term) -> Vec<String> {
    let mut lines = vec![term.to_string()];
    if term.is_normal_form() {
        lines.push("Lambda expression in its beta normal form.".to_string());
    } else {
        lines.push("Lambda expression that can be beta evaluated.".to_string());
    }
    let free = term.free_variables();
    if free.is_empty() {
        lines.push("This is a combinator.".to_string());
    } else {
        let free = free.iter().map(ToString::to_string).collect::<Vec<_>>();
        lines.push("This is the set of free variables:".to_string());
        lines.push(format!("{{{}}}", free.join(", ")));
    }
    lines
}

struct Session {
    bindings: HashTrieMap<String, Term>,
    limits: Limits,
    history: Option<PathBuf>,
}
impl Session {
    fn new(args: Args) -> Self {
        Self {
            bindings: HashTrieMap::new(),
            limits: Limits {
                max_steps: args.max_steps,
            },
            history: (!args.no_history).then_some(args.history),
        }
    }

    fn bind(&mut self, id: &str, input: &str) -> fwlc::Result<&Term> {
        let term = fwlc::build(input)?;
        self.bindings = self.bindings.insert(id.to_string(), term);
        Ok(&self.bindings[id])
    }

    fn lookup(&self, id: &str) -> Option<&Term> {
        self.bindings.get(id)
    }

    fn print_trace(&self, term: &Term, order: Order) -> fwlc::Result<()> {
        for term in fwlc::steps(term, order).limited(self.limits) {
            println!("{}", term?);
        }
        Ok(())
    }

    fn show_help() {
        println!(
            "{}",
            r#"
:h or :help      -- print this help
:q or :quit      -- leave the REPL
<Id> = <Exp>     -- bind the lambda expression <Exp> to <Id>; <Id> must be uppercase
<Id>             -- print the lambda expression bound to <Id>
<Exp>            -- print <Exp> in its canonical form
:NOBeval <Id>    -- print every step of the normal order beta evaluation of <Id>
:AOBeval <Id>    -- print every step of the applicative order beta evaluation of <Id>
:info <Id>       -- print some information about the lambda expression bound to <Id>

Lambda expressions are fully parenthesized, e.g. ((/x.(xx))((/z.(tz))r)),
where / stands for λ.
        "#
            .trim()
        );
    }

    fn handle(&mut self, input: &str) -> fwlc::Result<Flow> {
        match parse_command(input) {
            Command::Empty => {}
            Command::Quit => {
                println!("Goodbye!");
                return Ok(Flow::Quit);
            }
            Command::Help => Self::show_help(),
            Command::Bind(id, term) if is_identifier(id) => {
                let term = self.bind(id, term)?;
                println!("{term}");
            }
            Command::Bind(_, _) => eprintln!("This is not a valid identifier."),
            Command::Show(id) => match self.lookup(id) {
                Some(term) => println!("{term}"),
                None => eprintln!("`{id}` is not bound."),
            },
            Command::Eval(order, id) => match self.lookup(id) {
                Some(term) => self.print_trace(term, order)?,
                None => eprintln!("`{id}` is not bound."),
            },
            Command::Info(id) => match self.lookup(id) {
                Some(term) => describe(term).iter().for_each(|line| println!("{line}")),
                None => eprintln!("`{id}` is not bound."),
            },
            Command::Term(term) => println!("{}", fwlc::build(term)?),
            Command::Unknown(command) => {
                eprintln!("Unknown command {command}");
                Self::show_help();
            }
        }
        Ok(Flow::Continue)
    }

    /// The text a malformed-input offset refers to.
    fn offending_text(input: &str) -> &str {
        match parse_command(input) {
            Command::Bind(_, term) | Command::Term(term) => term,
            _ => input,
        }
    }
}
impl repl::Repl for Session {
    type Error = anyhow::Error;
    fn prompt(&self) -> &str {
        "<°λ°> "
    }
    fn history(&self) -> Option<&Path> {
        self.history.as_deref()
    }
    fn evaluate(&mut self, input: String) -> Result<Flow, Self::Error> {
        match self.handle(&input) {
            Ok(flow) => Ok(flow),
            Err(Error::Malformed { offset, found }) => {
                let text = Self::offending_text(&input);
                build_report(offset, found).eprint(Source::from(text))?;
                Ok(Flow::Continue)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Ok(Flow::Continue)
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    println!("Welcome in Fun With λ Calculus.");
    println!("Type :h or :help for help.");
    println!();
    repl::start_repl(Session::new(args))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn session() -> Session {
        Session::new(Args::parse_from(["fwlc", "--no-history", "--max-steps", "5"]))
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("  :q "), Command::Quit);
        assert_eq!(parse_command(":help"), Command::Help);
        assert_eq!(
            parse_command("ID = (/x.x)"),
            Command::Bind("ID", "(/x.x)")
        );
        assert_eq!(parse_command("ID"), Command::Show("ID"));
        assert_eq!(parse_command("(xy)"), Command::Term("(xy)"));
        assert_eq!(
            parse_command(":NOBeval ID"),
            Command::Eval(Order::Normal, "ID")
        );
        assert_eq!(
            parse_command(":AOBeval ID"),
            Command::Eval(Order::Applicative, "ID")
        );
        assert_eq!(parse_command(":info ID"), Command::Info("ID"));
        assert_eq!(parse_command(":license"), Command::Unknown(":license"));
        assert_eq!(parse_command("a b c d"), Command::Unknown("a b c d"));
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("DOUBLE"));
        assert!(!is_identifier("Double"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("X1"));
    }

    #[test]
    fn test_session() {
        let mut session = session();
        assert_eq!(session.limits.max_steps, Some(5));
        assert_eq!(session.history, None);
        assert_eq!(
            session.bind("D", "((/x.(xx))((/z.(tz))r))").unwrap().to_string(),
            "((λx.(xx))((λz.(tz))r))"
        );
        assert_eq!(
            session.bind("E", "(xyz)"),
            Err(Error::Malformed {
                offset: 3,
                found: Some('z')
            })
        );
        assert!(session.lookup("E").is_none());
        session.bind("D", "(/x.x)").unwrap();
        assert_eq!(session.lookup("D").unwrap().to_string(), "(λx.x)");
        assert_eq!(session.handle(":q"), Ok(Flow::Quit));
        assert_eq!(session.handle(":info D"), Ok(Flow::Continue));
    }

    #[test]
    fn test_trace_limit() {
        let mut session = session();
        session.bind("O", "((/x.(xx))(/x.(xx)))").unwrap();
        assert_eq!(
            session.handle(":NOBeval O"),
            Err(Error::StepLimitExceeded(5))
        );
    }

    #[test]
    fn test_describe() {
        let term = fwlc::build("(/x.(xy))").unwrap();
        assert_eq!(
            describe(&term),
            vec![
                "(λx.(xy))",
                "Lambda expression in its beta normal form.",
                "This is the set of free variables:",
                "{y}",
            ]
        );
        let term = fwlc::build("((/x.x)(/y.y))").unwrap();
        assert_eq!(
            describe(&term),
            vec![
                "((λx.x)(λy.y))",
                "Lambda expression that can be beta evaluated.",
                "This is a combinator.",
            ]
        );
    }

    #[test]
    fn test_offending_text() {
        assert_eq!(Session::offending_text("A = (xyz)"), "(xyz)");
        assert_eq!(Session::offending_text("(xyz)"), "(xyz)");
    }
}
