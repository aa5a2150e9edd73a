//! `memberbridge sync`: one reconciliation pass.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use memberbridge_sync::{pipeline, Outcome, PassReport, ReconcileOptions};

use super::{conscribo_client, directory_client, load_settings};

/// Arguments for `memberbridge sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be created or updated without touching the directory.
    #[arg(long)]
    pub dry_run: bool,

    /// Also update accounts whose name differs from the roster.
    #[arg(long)]
    pub compare_names: bool,

    /// Emit the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, properties: Option<&Path>) -> Result<()> {
        let settings = load_settings(properties)?;
        let options = ReconcileOptions {
            domain: settings.directory.domain.clone(),
            org_unit: settings.directory.org_unit.clone(),
            compare_names: self.compare_names || settings.compare_names,
            dry_run: self.dry_run,
        };

        let source = conscribo_client(&settings);
        let directory = directory_client(&settings);
        let report = pipeline::run_pass(&source, &directory, &options).context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_results(&report);
        }
        Ok(())
    }
}

fn print_results(report: &PassReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.records.is_empty() {
        println!("{prefix}✓ roster is empty, nothing to do");
        return;
    }

    for record in &report.records {
        let line = match &record.outcome {
            Outcome::Inserted { primary_email } => {
                format!("  {}  {} → {primary_email}", "+".green(), record.person)
            }
            Outcome::WouldInsert { primary_email } => {
                format!("  {}  {} → {primary_email}", "~".green(), record.person)
            }
            Outcome::Updated {
                primary_email,
                reasons,
            }
            | Outcome::WouldUpdate {
                primary_email,
                reasons,
            } => {
                let symbol = if report.dry_run { "~" } else { "✎" };
                let changed: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                format!(
                    "  {}  {} ({primary_email}): {}",
                    symbol.yellow(),
                    record.person,
                    changed.join(", ")
                )
            }
            Outcome::Unchanged { primary_email } => {
                format!("  {}  {} ({primary_email})", "·".bright_black(), record.person)
            }
            Outcome::Skipped { reason } => {
                format!("  {}  {}: {reason}", "-".bright_black(), record.person)
            }
            Outcome::Failed {
                primary_email,
                error,
                ..
            } => format!(
                "  {}  {} ({primary_email}): {error}",
                "✗".red().bold(),
                record.person
            ),
        };
        println!("{line}");
    }

    let summary = report.summary();
    println!(
        "{prefix}✓ {} members, {} accounts ({} created, {} updated, {} unchanged, {} skipped, {} failed)",
        report.roster_size,
        report.directory_size,
        summary.inserted,
        summary.updated,
        summary.unchanged,
        summary.skipped,
        summary.failed,
    );
}
