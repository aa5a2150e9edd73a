//! `memberbridge users`: the directory snapshot as a table.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use memberbridge_core::DirectoryAccount;

use super::{directory_client, load_settings};

/// Arguments for `memberbridge users`.
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Only list accounts that carry a Conscribo id.
    #[arg(long)]
    pub linked: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl UsersArgs {
    pub fn run(self, properties: Option<&Path>) -> Result<()> {
        let settings = load_settings(properties)?;
        let directory = directory_client(&settings);

        let mut accounts = directory
            .list_all_accounts()
            .context("failed to list directory accounts")?;
        if self.linked {
            accounts.retain(|a| a.conscribo_ids().next().is_some());
        }

        if self.json {
            print_json(&accounts)?;
            return Ok(());
        }
        print_table(directory.domain(), accounts);
        Ok(())
    }
}

#[derive(Serialize)]
struct AccountJson<'a> {
    primary_email: &'a str,
    given_name: &'a str,
    family_name: &'a str,
    recovery_email: Option<&'a str>,
    conscribo_ids: Vec<&'a str>,
    org_unit_path: Option<&'a str>,
    suspended: bool,
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "primary email")]
    primary_email: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "recovery email")]
    recovery_email: String,
    #[tabled(rename = "conscribo id")]
    conscribo_id: String,
    #[tabled(rename = "org unit")]
    org_unit: String,
}

fn print_json(accounts: &[DirectoryAccount]) -> Result<()> {
    let payload: Vec<AccountJson<'_>> = accounts
        .iter()
        .map(|a| AccountJson {
            primary_email: &a.primary_email,
            given_name: &a.name.given_name,
            family_name: &a.name.family_name,
            recovery_email: a.recovery_email.as_deref(),
            conscribo_ids: a.conscribo_ids().collect(),
            org_unit_path: a.org_unit_path.as_deref(),
            suspended: a.suspended.unwrap_or(false),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize accounts")?
    );
    Ok(())
}

fn print_table(domain: &str, accounts: Vec<DirectoryAccount>) {
    let linked = accounts
        .iter()
        .filter(|a| a.conscribo_ids().next().is_some())
        .count();
    println!(
        "memberbridge v{} | {} | {} accounts | {} linked",
        env!("CARGO_PKG_VERSION"),
        domain,
        accounts.len(),
        linked,
    );

    if accounts.is_empty() {
        println!("No accounts found.");
        return;
    }

    let rows: Vec<AccountRow> = accounts
        .into_iter()
        .map(|a| {
            let ids: Vec<&str> = a.conscribo_ids().collect();
            let conscribo_id = if ids.is_empty() {
                "-".bright_black().to_string()
            } else {
                ids.join(", ")
            };
            let name = if a.suspended.unwrap_or(false) {
                format!("{} {}", a.name.given_name, a.name.family_name)
                    .strikethrough()
                    .to_string()
            } else {
                format!("{} {}", a.name.given_name, a.name.family_name)
            };
            AccountRow {
                primary_email: a.primary_email,
                name,
                recovery_email: a.recovery_email.unwrap_or_default(),
                conscribo_id,
                org_unit: a.org_unit_path.unwrap_or_default(),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
