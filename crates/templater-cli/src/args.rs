//! Shared command arguments

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use templater_core::guess::slugify;
use templater_core::{Annotation, DataType, Document, Interval, ParamType};

/// Which document a command works on
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Configuration file to annotate
    #[arg(short, long, conflicts_with = "directive", required_unless_present = "directive")]
    pub file: Option<PathBuf>,

    /// Run command to annotate
    #[arg(short, long, value_name = "COMMAND")]
    pub directive: Option<String>,

    /// Working directory the directive runs in
    #[arg(long, requires = "directive")]
    pub cwd: Option<String>,
}

impl DocumentArgs {
    /// Load the selected document
    ///
    /// Config files are identified by their canonical path so the same file
    /// reached through different relative paths shares one record.
    pub fn load(&self) -> Result<Document> {
        match (&self.file, &self.directive) {
            (Some(path), _) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                let id = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                Ok(Document::config(id.display().to_string(), content))
            }
            (None, Some(command)) => Ok(Document::directive(command.trim(), self.cwd.clone())),
            (None, None) => anyhow::bail!("Either --file or --directive is required"),
        }
    }
}

/// Annotation form fields
///
/// Unset fields keep the value the form would start with.
#[derive(Args, Debug, Clone, Default)]
pub struct AnnotationArgs {
    /// Parameter name
    #[arg(long)]
    pub name: Option<String>,

    /// Human-readable name; the parameter name is derived from it
    #[arg(long, conflicts_with = "name", value_name = "TEXT")]
    pub display_name: Option<String>,

    /// Parameter description
    #[arg(long)]
    pub description: Option<String>,

    /// Value type (str, int, float, datetime, boolean)
    #[arg(long = "type", value_name = "TYPE")]
    pub param_type: Option<ParamType>,

    /// Data type (nominal, ordinal, numerical, freeform)
    #[arg(long)]
    pub data_type: Option<DataType>,

    /// Default value
    #[arg(long = "default", value_name = "VALUE", allow_hyphen_values = true)]
    pub default_value: Option<String>,

    /// Unit of measure
    #[arg(long)]
    pub unit: Option<String>,

    /// Description of the unit
    #[arg(long)]
    pub unit_description: Option<String>,

    /// Restrict values to the given options
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub predefined: Option<bool>,

    /// An allowed option (repeatable)
    #[arg(long = "option", value_name = "VALUE", allow_hyphen_values = true)]
    pub options: Vec<String>,

    /// Minimum value
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Maximum value
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
}

impl AnnotationArgs {
    /// Overlay the given fields onto `annotation`
    pub fn apply(self, annotation: &mut Annotation) {
        if let Some(name) = self.name {
            annotation.name = name;
        } else if let Some(display_name) = self.display_name {
            annotation.name = slugify(&display_name);
        }
        if let Some(description) = self.description {
            annotation.description = description;
        }
        if let Some(param_type) = self.param_type {
            annotation.param_type = Some(param_type);
        }
        if let Some(data_type) = self.data_type {
            annotation.data_type = Some(data_type);
        }
        if let Some(default_value) = self.default_value {
            annotation.default_value = default_value;
        }
        if let Some(unit) = self.unit {
            annotation.unit = unit;
        }
        if let Some(unit_description) = self.unit_description {
            annotation.unit_description = unit_description;
        }
        if let Some(predefined) = self.predefined {
            annotation.predefined = predefined;
        }
        if !self.options.is_empty() {
            annotation.options = self.options;
        }
        if self.min.is_some() {
            annotation.min = self.min;
        }
        if self.max.is_some() {
            annotation.max = self.max;
        }
    }
}

/// Parse a character range written as `START..END`
pub fn parse_interval(value: &str) -> Result<Interval, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", value))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start offset '{}'", start))?;
    let end = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end offset '{}'", end))?;
    Ok(Interval::new(start, end))
}
