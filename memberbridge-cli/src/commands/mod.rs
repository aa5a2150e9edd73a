//! Subcommands and the wiring they share.

pub mod fields;
pub mod sync;
pub mod users;

use std::path::Path;

use anyhow::{Context, Result};

use memberbridge_conscribo::ConscriboClient;
use memberbridge_core::{properties, Settings};
use memberbridge_directory::DirectoryClient;

/// Load settings from the property store, with a hint on failure.
pub(crate) fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    properties::load(explicit).context("failed to load properties")
}

pub(crate) fn conscribo_client(settings: &Settings) -> ConscriboClient {
    ConscriboClient::new(&settings.conscribo, settings.timeout)
}

pub(crate) fn directory_client(settings: &Settings) -> DirectoryClient {
    DirectoryClient::new(&settings.directory, settings.timeout)
}
