//! Parameter command handlers

use anyhow::{anyhow, Context, Result};

use templater_core::{
    AnnotationSession, Config, FileParameterStore, Highlight, Interval, ParameterLookup,
    SaveOutcome,
};

use super::{open_session, save_session};
use crate::args::{AnnotationArgs, DocumentArgs};
use crate::output::Output;
use crate::prompt::confirm;

/// Mark a span as a new parameter
pub fn add(
    config: &Config,
    document: &DocumentArgs,
    range: Interval,
    fields: AnnotationArgs,
    output: &Output,
) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let mut session = open_session(&storage, document, config, output)?;

    select(&mut session, range)?;
    let highlight = submit(&mut session, &storage, fields)?;
    commit(&storage, &session, output)?;

    output.success(&format!(
        "Added parameter '{}' at {}",
        highlight.name(),
        highlight.interval()
    ));
    output.print_highlight(&highlight);
    Ok(())
}

/// Change the annotation of an existing parameter
pub fn edit(
    config: &Config,
    document: &DocumentArgs,
    range: Interval,
    fields: AnnotationArgs,
    output: &Output,
) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let mut session = open_session(&storage, document, config, output)?;

    session.begin_edit(range)?;
    let highlight = submit(&mut session, &storage, fields)?;
    commit(&storage, &session, output)?;

    output.success(&format!("Updated parameter '{}'", highlight.name()));
    output.print_highlight(&highlight);
    Ok(())
}

/// Move a parameter to a new span, keeping its annotation
pub fn move_parameter(
    config: &Config,
    document: &DocumentArgs,
    from: Interval,
    to: Interval,
    fields: AnnotationArgs,
    output: &Output,
) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let mut session = open_session(&storage, document, config, output)?;

    session.begin_move(from)?;
    let placed = select(&mut session, to).and_then(|_| submit(&mut session, &storage, fields));
    let highlight = match placed {
        Ok(highlight) => highlight,
        Err(e) => {
            session.revert_move();
            return Err(e);
        }
    };
    commit(&storage, &session, output)?;

    output.success(&format!(
        "Moved parameter '{}' from {} to {}",
        highlight.name(),
        from,
        highlight.interval()
    ));
    Ok(())
}

/// Delete a parameter
pub fn delete(
    config: &Config,
    document: &DocumentArgs,
    range: Interval,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let storage = FileParameterStore::new(config);
    let mut session = open_session(&storage, document, config, output)?;

    let name = session
        .store()
        .get(range)
        .map(|h| h.name().to_string())
        .ok_or_else(|| anyhow!("No parameter found at {}", range))?;

    if output.should_prompt() && !yes {
        println!("Delete parameter: {} at {}", name, range);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.delete(range)?;
    commit(&storage, &session, output)?;

    output.success(&format!("Deleted parameter '{}'", name));
    Ok(())
}

fn select(session: &mut AnnotationSession, range: Interval) -> Result<()> {
    session
        .select_range(range.start, range.end)
        .map(|_| ())
        .map_err(|rejection| anyhow!("Cannot select {}: {}", range, rejection))
}

/// Fill the form from `fields` and submit it
fn submit(
    session: &mut AnnotationSession,
    storage: &FileParameterStore,
    fields: AnnotationArgs,
) -> Result<Highlight> {
    let mut annotation = session
        .form_values()
        .ok_or_else(|| anyhow!("No text is selected"))?;
    fields.apply(&mut annotation);

    let mode = session.document().mode();
    let saved = storage
        .saved_documents(mode)
        .with_context(|| format!("Failed to read saved {} parameters", mode))?;

    Ok(session.submit(annotation, &saved)?)
}

fn commit(storage: &FileParameterStore, session: &AnnotationSession, output: &Output) -> Result<()> {
    if let SaveOutcome::Skipped = save_session(storage, session)? {
        output.message("Nothing to save.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;
    use templater_core::{DataType, ParamType, ParameterStore};

    const CONFIG: &str = "rate: 0.5\nsteps: 100\n";

    struct Fixture {
        _temp_dir: TempDir,
        config: Config,
        document: DocumentArgs,
        output: Output,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("config.yaml");
            std::fs::write(&path, CONFIG).unwrap();

            let config = Config {
                data_dir: temp_dir.path().join("data"),
                ..Config::default()
            };
            Self {
                _temp_dir: temp_dir,
                config,
                document: DocumentArgs {
                    file: Some(path),
                    directive: None,
                    cwd: None,
                },
                output: Output::new(OutputFormat::Quiet),
            }
        }

        fn saved(&self) -> Vec<Highlight> {
            let storage = FileParameterStore::new(&self.config);
            let document = self.document.load().unwrap();
            storage
                .load(&document)
                .unwrap()
                .map(|r| r.parameters)
                .unwrap_or_default()
        }
    }

    fn fields(name: &str) -> AnnotationArgs {
        AnnotationArgs {
            name: Some(name.to_string()),
            description: Some(format!("The {}", name)),
            data_type: Some(DataType::Numerical),
            ..AnnotationArgs::default()
        }
    }

    #[test]
    fn test_add_saves_parameter() {
        let fx = Fixture::new();
        add(&fx.config, &fx.document, Interval::new(6, 9), fields("rate"), &fx.output).unwrap();

        let saved = fx.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name(), "rate");
        assert_eq!(saved[0].text, "0.5");
        // Guessed from the selected text
        assert_eq!(saved[0].annotation.param_type, Some(ParamType::Float));
        assert_eq!(saved[0].annotation.default_value, "0.5");
    }

    #[test]
    fn test_add_rejects_overlap_and_duplicates() {
        let fx = Fixture::new();
        add(&fx.config, &fx.document, Interval::new(6, 9), fields("rate"), &fx.output).unwrap();

        assert!(add(&fx.config, &fx.document, Interval::new(7, 12), fields("other"), &fx.output).is_err());
        let err = add(&fx.config, &fx.document, Interval::new(17, 20), fields("rate"), &fx.output)
            .unwrap_err();
        assert!(err.to_string().contains("rate is used"));
        assert_eq!(fx.saved().len(), 1);
    }

    #[test]
    fn test_add_incomplete_form_fails() {
        let fx = Fixture::new();
        let result = add(
            &fx.config,
            &fx.document,
            Interval::new(6, 9),
            AnnotationArgs::default(),
            &fx.output,
        );
        assert!(result.is_err());
        assert!(fx.saved().is_empty());
    }

    #[test]
    fn test_edit_and_move() {
        let fx = Fixture::new();
        add(&fx.config, &fx.document, Interval::new(6, 9), fields("rate"), &fx.output).unwrap();

        let update = AnnotationArgs {
            unit: Some("1/yr".to_string()),
            ..AnnotationArgs::default()
        };
        edit(&fx.config, &fx.document, Interval::new(6, 9), update, &fx.output).unwrap();
        assert_eq!(fx.saved()[0].annotation.unit, "1/yr");

        move_parameter(
            &fx.config,
            &fx.document,
            Interval::new(6, 9),
            Interval::new(17, 20),
            AnnotationArgs::default(),
            &fx.output,
        )
        .unwrap();

        let saved = fx.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].interval(), Interval::new(17, 20));
        assert_eq!(saved[0].text, "100");
        assert_eq!(saved[0].annotation.unit, "1/yr");
    }

    #[test]
    fn test_failed_move_leaves_record_untouched() {
        let fx = Fixture::new();
        add(&fx.config, &fx.document, Interval::new(6, 9), fields("rate"), &fx.output).unwrap();
        let before = fx.saved();

        let result = move_parameter(
            &fx.config,
            &fx.document,
            Interval::new(6, 9),
            Interval::new(15, 40),
            AnnotationArgs::default(),
            &fx.output,
        );
        assert!(result.is_err());
        assert_eq!(fx.saved(), before);
    }

    #[test]
    fn test_delete() {
        let fx = Fixture::new();
        add(&fx.config, &fx.document, Interval::new(6, 9), fields("rate"), &fx.output).unwrap();

        delete(&fx.config, &fx.document, Interval::new(6, 9), true, &fx.output).unwrap();
        assert!(fx.saved().is_empty());
        assert!(delete(&fx.config, &fx.document, Interval::new(6, 9), true, &fx.output).is_err());
    }
}
