//! WHERE-clause predicates
//!
//! A predicate renders as `<column> <op> '<literal>'`. The literal is written
//! verbatim between single quotes; quotes inside it are not escaped, so
//! callers must not pass untrusted text.

use std::fmt;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Gt,
    Gte,
    Lte,
    Like,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
        }
    }
}

/// An immutable column/operator/literal comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    column: String,
    operator: Operator,
    literal: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: Operator, literal: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            literal: literal.into(),
        }
    }

    pub fn eq(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(column, Operator::Eq, literal)
    }

    pub fn lt(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(column, Operator::Lt, literal)
    }

    pub fn gt(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(column, Operator::Gt, literal)
    }

    pub fn gte(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(column, Operator::Gte, literal)
    }

    pub fn lte(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::new(column, Operator::Lte, literal)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Operator::Like, pattern)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.column, self.operator.symbol(), self.literal)
    }
}
