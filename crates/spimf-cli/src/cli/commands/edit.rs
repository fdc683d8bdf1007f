//! Field edit handler.

use anyhow::Result;
use spimf_core::config::Config;
use spimf_core::editor::EditOutcome;

use super::{open_portal, prompt};

pub async fn run(config: &Config, field: &str, value: Option<String>) -> Result<()> {
    let mut portal = open_portal(config)?;

    let (field, current) = {
        let edit = portal.begin_edit(field)?;
        (edit.field.clone(), edit.current_value.clone())
    };

    let value = match value {
        Some(value) => value,
        None => {
            let shown = if current.is_empty() {
                "(empty)"
            } else {
                current.as_str()
            };
            println!("Editing {field} (current: {shown})");
            prompt("New value (leave empty to cancel): ")?
        }
    };

    match portal.save_edit(&value).await? {
        EditOutcome::Saved => println!("✓ Updated {field}"),
        EditOutcome::Unchanged => println!("No changes made."),
    }
    Ok(())
}
