//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use templater_core::{Highlight, SavedParameters, Segment};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode output: {}", e),
        }
    }

    /// Print document text with its parameters marked inline
    pub fn print_document(&self, id: &str, segments: &[Segment], parameters: &[Highlight]) {
        match self.format {
            OutputFormat::Human => {
                println!("── {} ──", id);
                println!("{}", mark_segments(segments));
                println!();
                self.print_parameters(parameters);
            }
            OutputFormat::Json => {
                self.print_json(&serde_json::json!({
                    "id": id,
                    "segments": segments,
                    "parameters": parameters,
                }));
            }
            OutputFormat::Quiet => {
                for highlight in parameters {
                    println!("{}", highlight.name());
                }
            }
        }
    }

    /// Print a single parameter
    pub fn print_highlight(&self, highlight: &Highlight) {
        match self.format {
            OutputFormat::Human => {
                let annotation = &highlight.annotation;
                println!("Name:        {}", annotation.name);
                println!("Span:        {}", highlight.interval());
                println!("Text:        {}", highlight.text);
                println!("Description: {}", annotation.description);
                if let Some(param_type) = annotation.param_type {
                    println!("Type:        {}", param_type);
                }
                if let Some(data_type) = annotation.data_type {
                    println!("Data type:   {}", data_type);
                }
                if !annotation.default_value.is_empty() {
                    println!("Default:     {}", annotation.default_value);
                }
                if !annotation.unit.is_empty() {
                    println!("Unit:        {}", annotation.unit);
                }
                if annotation.predefined {
                    println!("Options:     {}", annotation.options.join(", "));
                }
                if let Some(min) = annotation.min {
                    println!("Min:         {}", min);
                }
                if let Some(max) = annotation.max {
                    println!("Max:         {}", max);
                }
            }
            OutputFormat::Json => self.print_json(highlight),
            OutputFormat::Quiet => println!("{}", highlight.name()),
        }
    }

    /// Print a table of parameters
    pub fn print_parameters(&self, parameters: &[Highlight]) {
        match self.format {
            OutputFormat::Human => {
                if parameters.is_empty() {
                    println!("No parameters.");
                    return;
                }
                let mut sorted: Vec<&Highlight> = parameters.iter().collect();
                sorted.sort_by_key(|h| h.interval());
                for highlight in &sorted {
                    let annotation = &highlight.annotation;
                    println!(
                        "{:<10} | {:<20} | {:<8} | {}",
                        highlight.interval().to_string(),
                        truncate(&annotation.name, 20),
                        annotation.param_type.map(|t| t.as_str()).unwrap_or("-"),
                        truncate(&annotation.description, 40)
                    );
                }
                println!("\n{} parameter(s)", parameters.len());
            }
            OutputFormat::Json => self.print_json(parameters),
            OutputFormat::Quiet => {
                for highlight in parameters {
                    println!("{}", highlight.name());
                }
            }
        }
    }

    /// Print a list of saved documents
    pub fn print_saved(&self, records: &[SavedParameters]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No saved documents.");
                    return;
                }
                for record in records {
                    println!(
                        "{:<9} | {:>3} param(s) | {} | {}",
                        record.mode.as_str(),
                        record.parameters.len(),
                        record.saved_at.format("%Y-%m-%d %H:%M"),
                        truncate(&record.id, 50)
                    );
                }
                println!("\n{} document(s)", records.len());
            }
            OutputFormat::Json => self.print_json(records),
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print rendered template text
    pub fn print_template(&self, rendered: &str) {
        match self.format {
            OutputFormat::Json => self.print_json(&serde_json::json!({ "template": rendered })),
            // The template is the payload, so quiet mode still prints it
            OutputFormat::Human | OutputFormat::Quiet => print!("{}", rendered),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("Warning: {}", message);
        }
    }

    /// Print a follow-up hint to stderr after a failure
    pub fn hint(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("Hint: {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Wrap marked segments as `[[text|name]]`
fn mark_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|seg| match (&seg.annotation, seg.mark) {
            (Some(annotation), true) => format!("[[{}|{}]]", seg.content, annotation.name),
            (None, true) => format!("[[{}]]", seg.content),
            _ => seg.content.clone(),
        })
        .collect()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
