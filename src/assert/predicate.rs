// Per-item predicates for collection assertions

use regex::Regex;
use serde_json::Value;

use crate::error::UsageError;

/// Why an item failed a predicate: the offending value and a reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub value: String,
    pub reason: String,
}

impl Violation {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A check applied to every extracted item
pub trait ItemPredicate: Send + Sync {
    fn check(&self, item: &Value) -> Result<(), Violation>;

    /// Human-readable description for reports
    fn describe(&self) -> String;
}

impl<F> ItemPredicate for F
where
    F: Fn(&Value) -> Result<(), Violation> + Send + Sync,
{
    fn check(&self, item: &Value) -> Result<(), Violation> {
        self(item)
    }

    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

/// Resolve a dotted path (`address.postCode`) inside an item
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(item, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn string_field<'a>(item: &'a Value, path: &str) -> Result<&'a str, Violation> {
    match lookup(item, path) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Violation::new(
            other.to_string(),
            format!("field '{}' is not a string", path),
        )),
        None => Err(Violation::new("<missing>", format!("field '{}' is missing", path))),
    }
}

/// String field must start with a prefix
#[derive(Debug, Clone)]
pub struct FieldPrefix {
    path: String,
    prefix: String,
}

impl FieldPrefix {
    pub fn new(path: impl Into<String>, prefix: impl Into<String>) -> Result<Self, UsageError> {
        let path = path.into();
        let prefix = prefix.into();
        if path.trim().is_empty() {
            return Err(UsageError::EmptyArgument("Field path"));
        }
        if prefix.trim().is_empty() {
            return Err(UsageError::EmptyArgument("Postcode prefix"));
        }
        Ok(Self { path, prefix })
    }

    /// `address.postCode` starts with `prefix`
    pub fn postcode(prefix: impl Into<String>) -> Result<Self, UsageError> {
        Self::new("address.postCode", prefix)
    }
}

impl ItemPredicate for FieldPrefix {
    fn check(&self, item: &Value) -> Result<(), Violation> {
        let value = string_field(item, &self.path)?;
        if value.starts_with(&self.prefix) {
            Ok(())
        } else {
            Err(Violation::new(
                value,
                format!("does not start with '{}'", self.prefix),
            ))
        }
    }

    fn describe(&self) -> String {
        format!("{} starts with '{}'", self.path, self.prefix)
    }
}

/// String field must match a regular expression
#[derive(Debug, Clone)]
pub struct FieldMatches {
    path: String,
    pattern: Regex,
}

impl FieldMatches {
    pub fn new(path: impl Into<String>, pattern: &str) -> Result<Self, UsageError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(UsageError::EmptyArgument("Field path"));
        }
        let pattern = Regex::new(pattern).map_err(|e| UsageError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { path, pattern })
    }
}

impl ItemPredicate for FieldMatches {
    fn check(&self, item: &Value) -> Result<(), Violation> {
        let value = string_field(item, &self.path)?;
        if self.pattern.is_match(value) {
            Ok(())
        } else {
            Err(Violation::new(
                value,
                format!("does not match /{}/", self.pattern.as_str()),
            ))
        }
    }

    fn describe(&self) -> String {
        format!("{} matches /{}/", self.path, self.pattern.as_str())
    }
}
