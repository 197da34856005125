// Item collection extraction from responses of unknown shape
//
// Order, first match wins:
//   1. body starts with `[`  -> top-level array
//   2. object with `parcelShops`, `data` or `results` (in that order)
//   3. empty body / none of the fields -> empty result

use serde_json::{Map, Value};
use thiserror::Error;

/// Object fields that may hold the item collection, in priority order
pub const COLLECTION_FIELDS: [&str; 3] = ["parcelShops", "data", "results"];

/// Where the items were found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    TopLevelArray,
    Field(&'static str),
    NotFound,
}

impl ItemSource {
    /// JSON path of the collection (`$`, `$.data`, ...); empty when not found
    pub fn path(&self) -> String {
        match self {
            Self::TopLevelArray => "$".to_string(),
            Self::Field(name) => format!("$.{}", name),
            Self::NotFound => String::new(),
        }
    }
}

/// Extracted items. An empty result is valid and not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub items: Vec<Value>,
    pub source: ItemSource,
}

impl ExtractionResult {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            source: ItemSource::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn path(&self) -> String {
        self.source.path()
    }
}

/// Data-shape failures, distinct from "zero items found"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Cannot parse response body as JSON at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Cannot locate item collection: expected a JSON array or object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Cannot locate item collection: field '{field}' is {found}, expected an array")]
    FieldNotArray { field: &'static str, found: &'static str },
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn from_object(mut object: Map<String, Value>) -> Result<ExtractionResult, ExtractError> {
    for field in COLLECTION_FIELDS {
        if let Some(value) = object.remove(field) {
            return match value {
                Value::Array(items) => Ok(ExtractionResult {
                    items,
                    source: ItemSource::Field(field),
                }),
                other => Err(ExtractError::FieldNotArray {
                    field,
                    found: type_name(&other),
                }),
            };
        }
    }

    Ok(ExtractionResult::empty())
}

/// Locate the item collection in a raw response body
pub fn extract(body: &str) -> Result<ExtractionResult, ExtractError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(ExtractionResult::empty());
    }

    if trimmed.starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(ExtractionResult {
            items,
            source: ItemSource::TopLevelArray,
        });
    }

    match serde_json::from_str::<Value>(trimmed)? {
        Value::Object(object) => from_object(object),
        other => Err(ExtractError::NotAnObject {
            found: type_name(&other),
        }),
    }
}
