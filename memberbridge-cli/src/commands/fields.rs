//! `memberbridge fields`: field definitions of the member entity.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use super::{conscribo_client, load_settings};

/// Arguments for `memberbridge fields`.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "field")]
    field: String,
    #[tabled(rename = "label")]
    label: String,
    #[tabled(rename = "type")]
    kind: String,
}

impl FieldsArgs {
    pub fn run(self, properties: Option<&Path>) -> Result<()> {
        let settings = load_settings(properties)?;
        let client = conscribo_client(&settings);

        let session = client
            .authenticate()
            .context("failed to authenticate with Conscribo")?;
        let fields = client
            .list_field_definitions(&session)
            .context("failed to list field definitions")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&fields).context("failed to serialize fields")?
            );
            return Ok(());
        }

        if fields.is_empty() {
            println!("No field definitions returned.");
            return Ok(());
        }
        let rows: Vec<FieldRow> = fields
            .into_iter()
            .map(|f| FieldRow {
                field: f.field_name,
                label: f.label.unwrap_or_default(),
                kind: f.kind.unwrap_or_default(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
