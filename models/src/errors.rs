// models/src/errors.rs

use std::fmt;

use serde::Serialize;
pub use thiserror::Error;

/// One segment of an error location, e.g. the `0` or `"age"` in `["body", 0, "age"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Field(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(field: &str) -> Self {
        Loc::Field(field.to_string())
    }
}

impl From<usize> for Loc {
    fn from(index: usize) -> Self {
        Loc::Index(index)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loc::Field(name) => f.write_str(name),
            Loc::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A single coercion failure, serialized as `{"loc": [...], "msg": "...", "type": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<Loc>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    fn new(loc: Vec<Loc>, msg: impl Into<String>, kind: &'static str) -> Self {
        FieldError { loc, msg: msg.into(), kind }
    }

    pub fn json_decode(loc: Vec<Loc>, msg: impl Into<String>) -> Self {
        Self::new(loc, msg, "value_error.jsondecode")
    }

    pub fn not_a_list(loc: Vec<Loc>) -> Self {
        Self::new(loc, "value is not a valid list", "type_error.list")
    }

    pub fn not_a_dict(loc: Vec<Loc>) -> Self {
        Self::new(loc, "value is not a valid dict", "type_error.dict")
    }

    pub fn missing(loc: Vec<Loc>) -> Self {
        Self::new(loc, "field required", "value_error.missing")
    }

    pub fn none_not_allowed(loc: Vec<Loc>) -> Self {
        Self::new(loc, "none is not an allowed value", "type_error.none.not_allowed")
    }

    pub fn not_an_integer(loc: Vec<Loc>) -> Self {
        Self::new(loc, "value is not a valid integer", "type_error.integer")
    }

    pub fn not_a_str(loc: Vec<Loc>) -> Self {
        Self::new(loc, "str type expected", "type_error.str")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.loc.iter().map(|segment| segment.to_string()).collect();
        write!(f, "{}: {}", path.join(" -> "), self.msg)
    }
}

/// Every field error found in one request body. A batch is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(transparent)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        ValidationErrors(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn summarize(errors: &[FieldError]) -> String {
    match errors {
        [] => "request body failed validation".to_string(),
        [only] => format!("1 validation error: {}", only),
        [first, rest @ ..] => format!("{} validation errors, first: {}", rest.len() + 1, first),
    }
}
