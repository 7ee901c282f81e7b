//! Permitted-value sets for domain checks.
//!
//! A set is written the way it would appear inside `IN (...)`: integers and
//! single-quoted strings separated by commas, e.g. `0, 1` or `'EA', 'BOX'`.
//! Parsed values are bound as parameters, never spliced into the statement.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// One permitted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// Integer literal.
    Int(i64),
    /// String literal (quotes removed, `''` unescaped).
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl FromStr for SqlValue {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        if let Ok(n) = token.parse::<i64>() {
            return Ok(Self::Int(n));
        }

        let inner = token
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
            .filter(|_| token.len() >= 2)
            .ok_or_else(|| Error::InvalidValueSet(format!("unrecognized literal: {token:?}")))?;

        // A lone quote inside the literal would have ended it.
        if inner.replace("''", "").contains('\'') {
            return Err(Error::InvalidValueSet(format!(
                "unescaped quote in literal: {token:?}"
            )));
        }
        Ok(Self::Text(inner.replace("''", "'")))
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A non-empty list of permitted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AllowedValues(Vec<SqlValue>);

impl AllowedValues {
    /// Build from already-typed values.
    pub fn new(values: Vec<SqlValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidValueSet("empty value set".to_string()));
        }
        Ok(Self(values))
    }

    /// Integer set, e.g. `AllowedValues::ints([1, 2, 3])`.
    pub fn ints(values: impl IntoIterator<Item = i64>) -> Result<Self> {
        Self::new(values.into_iter().map(SqlValue::Int).collect())
    }

    /// The values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.0
    }

    /// `@P1, @P2, ...` placeholders, numbered from `first`.
    #[must_use]
    pub fn placeholders(&self, first: usize) -> String {
        (first..first + self.0.len())
            .map(|i| format!("@P{i}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for AllowedValues {
    type Err = Error;

    /// Split on commas outside quotes.
    fn from_str(list: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for c in list.chars() {
            match c {
                '\'' => {
                    in_quotes = !in_quotes;
                    current.push(c);
                }
                ',' if !in_quotes => tokens.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        if in_quotes {
            return Err(Error::InvalidValueSet(format!("unterminated quote in {list:?}")));
        }
        tokens.push(current);

        if tokens.len() == 1 && tokens[0].trim().is_empty() {
            return Err(Error::InvalidValueSet("empty value set".to_string()));
        }

        let values = tokens
            .iter()
            .map(|t| {
                if t.trim().is_empty() {
                    Err(Error::InvalidValueSet(format!("empty element in {list:?}")))
                } else {
                    t.parse::<SqlValue>()
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(values)
    }
}

impl fmt::Display for AllowedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(", "))
    }
}
