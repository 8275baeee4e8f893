//! Template rendering
//!
//! Produces the parameterized form of a document, with every highlight
//! replaced by a `{{ name }}` placeholder.

use crate::models::Highlight;
use crate::segment::segment;

/// Render `text` with each highlight replaced by its placeholder
pub fn render_template(text: &str, highlights: &[Highlight]) -> String {
    segment(text, highlights)
        .into_iter()
        .map(|seg| match seg.annotation {
            Some(annotation) if seg.mark => placeholder(&annotation.name),
            _ => seg.content,
        })
        .collect()
}

/// The placeholder text for a parameter name
pub fn placeholder(name: &str) -> String {
    format!("{{{{ {} }}}}", name)
}
