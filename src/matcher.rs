//! Compiled matchers.
//!
//! A [`Matcher`] tests one argument; an [`OverloadMatcher`] tests a whole
//! positional argument list against one signature; a [`FunctionMatcher`]
//! groups every overload of a function. All three are immutable once built
//! by the [`compiler`](crate::compiler).

use crate::registry::Predicate;
use crate::value::Value;
use smol_str::SmolStr;
use std::fmt::{self, Write as _};

static ABSENT: Value = Value::Absent;

/// Per-argument matcher.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A single registered type.
    Primitive { name: SmolStr, predicate: Predicate },
    /// Accepts a value matching any member.
    Union(Vec<Matcher>),
    /// Accepts exactly one of these strings, case-sensitively.
    Enum(Vec<SmolStr>),
    /// Also accepts [`Value::Absent`].
    Optional(Box<Matcher>),
}

impl Matcher {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Matcher::Primitive { predicate, .. } => predicate.accepts(value),
            Matcher::Union(members) => members.iter().any(|m| m.matches(value)),
            Matcher::Enum(constants) => value
                .as_str()
                .is_some_and(|s| constants.iter().any(|c| c == s)),
            Matcher::Optional(inner) => value.is_absent() || inner.matches(value),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Matcher::Optional(_))
    }

    fn write_tree(&self, out: &mut String, indent: usize) -> fmt::Result {
        let spaces = "  ".repeat(indent);
        match self {
            Matcher::Union(members) => {
                write!(out, "Union of:")?;
                for member in members {
                    write!(out, "\n{}  - ", spaces)?;
                    member.write_tree(out, indent + 1)?;
                }
                Ok(())
            }
            Matcher::Optional(inner) => {
                write!(out, "Optional(")?;
                inner.write_tree(out, indent)?;
                write!(out, ")")
            }
            Matcher::Primitive { .. } | Matcher::Enum(_) => write!(out, "{}", self),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Primitive { name, .. } => write!(f, "{}", name),
            Matcher::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Matcher::Enum(constants) => {
                write!(f, "one of ")?;
                for (i, constant) in constants.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", constant.as_str())?;
                }
                Ok(())
            }
            Matcher::Optional(inner) => write!(f, "Optional({})", inner),
        }
    }
}

/// Why one position failed inside one overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionFailure {
    pub position: usize,
    pub expected: String,
    pub actual: String,
}

/// Outcome of checking an argument list against one overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadCheck {
    /// Failing positions in ascending order; empty on a match.
    pub failures: Vec<PositionFailure>,
}

impl OverloadCheck {
    pub fn is_match(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&PositionFailure> {
        self.failures.first()
    }
}

/// One compiled signature.
#[derive(Debug, Clone)]
pub struct OverloadMatcher {
    params: Vec<Matcher>,
    min_arity: usize,
}

impl OverloadMatcher {
    /// Builds an overload; the minimum arity is the position just past the
    /// last non-optional parameter.
    pub fn new(params: Vec<Matcher>) -> Self {
        let min_arity = params
            .iter()
            .rposition(|m| !m.is_optional())
            .map_or(0, |last| last + 1);
        Self { params, min_arity }
    }

    pub fn params(&self) -> &[Matcher] {
        &self.params
    }

    /// Fewest arguments this overload accepts.
    pub fn min_arity(&self) -> usize {
        self.min_arity
    }

    /// Most arguments this overload accepts.
    pub fn max_arity(&self) -> usize {
        self.params.len()
    }

    pub fn matches_arity(&self, arg_count: usize) -> bool {
        arg_count >= self.min_arity && arg_count <= self.max_arity()
    }

    /// Checks every position and records each one that fails.
    ///
    /// Omitted trailing positions are treated as [`Value::Absent`]; extra
    /// arguments past the declared parameters each count as a failure.
    pub fn check(&self, args: &[Value]) -> OverloadCheck {
        let mut failures = Vec::new();
        for position in 0..args.len().max(self.params.len()) {
            let value = args.get(position).unwrap_or(&ABSENT);
            match self.params.get(position) {
                Some(matcher) => {
                    if !matcher.matches(value) {
                        failures.push(PositionFailure {
                            position,
                            expected: matcher.to_string(),
                            actual: value.type_name().to_string(),
                        });
                    }
                }
                None => failures.push(PositionFailure {
                    position,
                    expected: format!("no argument (at most {})", self.params.len()),
                    actual: value.type_name().to_string(),
                }),
            }
        }
        OverloadCheck { failures }
    }

    fn write_tree(&self, out: &mut String, indent: usize) -> fmt::Result {
        let spaces = "  ".repeat(indent);
        write!(out, "Tuple [")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(out, ",")?;
            }
            write!(out, "\n{}  ", spaces)?;
            param.write_tree(out, indent + 1)?;
        }
        write!(out, "\n{}]", spaces)
    }
}

impl fmt::Display for OverloadMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// Every overload of one function, in declaration order.
#[derive(Debug, Clone)]
pub enum FunctionMatcher {
    Single(OverloadMatcher),
    AnyOf(Vec<OverloadMatcher>),
}

impl FunctionMatcher {
    /// Wraps compiled overloads, collapsing a lone overload to `Single`.
    pub fn from_overloads(mut overloads: Vec<OverloadMatcher>) -> Self {
        if overloads.len() == 1 {
            if let Some(only) = overloads.pop() {
                return FunctionMatcher::Single(only);
            }
        }
        FunctionMatcher::AnyOf(overloads)
    }

    pub fn overloads(&self) -> &[OverloadMatcher] {
        match self {
            FunctionMatcher::Single(overload) => std::slice::from_ref(overload),
            FunctionMatcher::AnyOf(overloads) => overloads,
        }
    }

    /// Index of the first overload that accepts `args`.
    pub fn first_match(&self, args: &[Value]) -> Option<usize> {
        self.overloads()
            .iter()
            .position(|overload| overload.check(args).is_match())
    }

    /// Multi-line tree rendering, for debugging output.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = match self {
            FunctionMatcher::Single(overload) => overload.write_tree(&mut out, 0),
            FunctionMatcher::AnyOf(overloads) => {
                let _ = write!(out, "Union of:");
                overloads.iter().try_for_each(|overload| {
                    write!(out, "\n  - ")?;
                    overload.write_tree(&mut out, 1)
                })
            }
        };
        out
    }
}
