//! Query translation: filters -> predicates -> SQL.
//!
//! # Responsibility
//! - Turn typed filter values into boolean SQL fragments.
//! - Assemble fragments over the fixed task join topology.
//!
//! # Invariants
//! - Nothing in this module performs I/O.
//! - Every user-supplied string is escaped before it reaches SQL text.
//! - An empty fragment always means "no constraint".

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assemble;
pub mod filter;
pub mod predicate;

pub type QueryResult<T> = Result<T, QueryError>;

/// Parameter validation and literal rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A filter argument is outside its declared domain.
    InvalidParameter {
        parameter: String,
        value: String,
        expected: String,
    },
    /// A string cannot be represented as an SQL literal.
    MalformedLiteral { parameter: String, value: String },
}

impl QueryError {
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                expected,
            } => write!(
                f,
                "unrecognized {parameter} value `{value}`; valid {parameter} values are {expected}"
            ),
            Self::MalformedLiteral { parameter, value } => write!(
                f,
                "{parameter} value {value:?} contains a NUL character and cannot be used as a literal"
            ),
        }
    }
}

impl Error for QueryError {}
