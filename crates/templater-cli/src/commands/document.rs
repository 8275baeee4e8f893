//! Document command handlers

use anyhow::{Context, Result};

use templater_core::{render_template, Config, DocumentMode, FileParameterStore, ParameterLookup};

use super::open_session;
use crate::args::DocumentArgs;
use crate::output::Output;

/// Show a document with its parameters marked
pub fn show(config: &Config, document: &DocumentArgs, output: &Output) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let session = open_session(&storage, document, config, output)?;

    output.print_document(
        session.document().id(),
        &session.segments(),
        session.highlights(),
    );
    Ok(())
}

/// Print the document as a template
pub fn render(config: &Config, document: &DocumentArgs, output: &Output) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let session = open_session(&storage, document, config, output)?;

    let rendered = render_template(session.document().content(), session.highlights());
    output.print_template(&rendered);
    Ok(())
}

/// List annotated documents
pub fn list(config: &Config, directives_only: bool, configs_only: bool, output: &Output) -> Result<()> {
    let storage = FileParameterStore::new(config);

    let mut modes = Vec::new();
    if !directives_only {
        modes.push(DocumentMode::Config);
    }
    if !configs_only {
        modes.push(DocumentMode::Directive);
    }

    let mut records = Vec::new();
    for mode in modes {
        let saved = storage
            .saved_documents(mode)
            .with_context(|| format!("Failed to list saved {}s", mode))?;
        records.extend(saved);
    }

    output.print_saved(&records);
    Ok(())
}
