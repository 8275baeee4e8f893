//! Data models for the templater
//!
//! Defines highlights, the parameter annotations attached to them, and the
//! saved parameter records exchanged with storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{Document, DocumentMode};

/// Half-open character range `[start, end)` into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Failed to parse a parameter or data type from a string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'. Expected one of: {expected}")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Value type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Datetime,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Datetime => "datetime",
            ParamType::Boolean => "boolean",
        }
    }

    /// Whether min/max bounds apply to this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParamType::Int | ParamType::Float)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(ParamType::Str),
            "int" => Ok(ParamType::Int),
            "float" => Ok(ParamType::Float),
            "datetime" => Ok(ParamType::Datetime),
            "boolean" => Ok(ParamType::Boolean),
            _ => Err(ParseKindError {
                kind: "type",
                value: s.to_string(),
                expected: "str, int, float, datetime, boolean",
            }),
        }
    }
}

/// Measurement scale of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Nominal,
    Ordinal,
    Numerical,
    Freeform,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Nominal => "nominal",
            DataType::Ordinal => "ordinal",
            DataType::Numerical => "numerical",
            DataType::Freeform => "freeform",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nominal" => Ok(DataType::Nominal),
            "ordinal" => Ok(DataType::Ordinal),
            "numerical" => Ok(DataType::Numerical),
            "freeform" => Ok(DataType::Freeform),
            _ => Err(ParseKindError {
                kind: "data type",
                value: s.to_string(),
                expected: "nominal, ordinal, numerical, freeform",
            }),
        }
    }
}

/// A single validation failure on an annotation field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structured metadata describing a highlighted parameter
///
/// `param_type` and `data_type` are optional so that a blank form can be
/// represented; `validate` reports them as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Variable name, unique per namespace
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub param_type: Option<ParamType>,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_description: String,
    pub data_type: Option<DataType>,
    /// Users must choose from `options`
    #[serde(default)]
    pub predefined: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Annotation {
    /// Blank form values seeded with the selected text as default value
    pub fn blank(default_value: impl Into<String>) -> Self {
        Self {
            default_value: default_value.into(),
            ..Self::default()
        }
    }

    /// Bring the annotation into its stored shape
    ///
    /// Options are cleared unless `predefined`; a non-empty default value
    /// missing from the options is prepended; bounds are dropped for
    /// non-numeric types.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();

        if !self.predefined {
            self.options.clear();
        } else if !self.default_value.is_empty() && !self.options.contains(&self.default_value) {
            self.options.insert(0, self.default_value.clone());
        }

        if !self.param_type.map(|t| t.is_numeric()).unwrap_or(false) {
            self.min = None;
            self.max = None;
        }
    }

    /// Check the annotation, returning every field error found
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "A parameter name is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new(
                "description",
                "A parameter description is required",
            ));
        }
        if self.param_type.is_none() {
            errors.push(FieldError::new("type", "A parameter type is required"));
        }
        if self.data_type.is_none() {
            errors.push(FieldError::new(
                "data_type",
                "A parameter data type is required",
            ));
        }

        if self.predefined {
            if self.options.is_empty() {
                errors.push(FieldError::new(
                    "predefined",
                    "At least one option is required with \"pre-defined options\" selected",
                ));
            } else if self.options.iter().any(|o| o.trim().is_empty()) {
                errors.push(FieldError::new(
                    "options",
                    "Please fill out or remove any blank options before submitting",
                ));
            }
        }

        for (field, bound) in [("min", self.min), ("max", self.max)] {
            if let Some(value) = bound {
                if !value.is_finite() {
                    errors.push(FieldError::new(field, "Must be a number"));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                errors.push(FieldError::new("max", "Must not be less than min"));
            }
        }

        errors
    }
}

/// A highlighted span of a document with its parameter annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    /// The text originally selected; never recomputed after creation
    pub text: String,
    pub annotation: Annotation,
}

impl Highlight {
    pub fn new(interval: Interval, text: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            text: text.into(),
            annotation,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn name(&self) -> &str {
        &self.annotation.name
    }
}

/// The parameters saved for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedParameters {
    pub mode: DocumentMode,
    /// Path for configs, command for directives
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Hash of the document text the parameters were placed against
    pub content_hash: String,
    pub saved_at: DateTime<Utc>,
    pub parameters: Vec<Highlight>,
}

impl SavedParameters {
    /// Build a record for `document` holding `parameters`
    pub fn new(document: &Document, parameters: Vec<Highlight>) -> Self {
        Self {
            mode: document.mode(),
            id: document.id().to_string(),
            cwd: document.cwd().map(str::to_string),
            content_hash: document.content_hash(),
            saved_at: Utc::now(),
            parameters,
        }
    }

    /// Whether this record belongs to `document`
    pub fn is_for(&self, document: &Document) -> bool {
        self.mode == document.mode() && self.id == document.id()
    }

    /// The document text changed since these parameters were saved
    pub fn content_changed(&self, document: &Document) -> bool {
        self.content_hash != document.content_hash()
    }
}
