//! Blocking Admin Directory API client with transparent pagination.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use memberbridge_core::properties::{DirectorySettings, Secret};
use memberbridge_core::{AccountPatch, DirectoryAccount};

use crate::error::DirectoryResult;

/// Sort order requested for every listing.
pub const ORDER_BY: &str = "givenName";

/// One page of the `users.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPage {
    /// Absent when the domain has no (more) users.
    pub users: Option<Vec<DirectoryAccount>>,
    pub next_page_token: Option<String>,
}

/// Admin Directory API client for one domain.
#[derive(Debug)]
pub struct DirectoryClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: Secret,
    domain: String,
    page_size: u32,
}

impl DirectoryClient {
    pub fn new(settings: &DirectorySettings, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            access_token: settings.access_token.clone(),
            domain: settings.domain.clone(),
            page_size: settings.page_size,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Fetch a single page, continuing from `page_token` when given.
    pub fn list_page(&self, page_token: Option<&str>) -> DirectoryResult<AccountPage> {
        let mut request = self
            .agent
            .get(&self.users_url())
            .set("Authorization", &self.bearer())
            .query("domain", &self.domain)
            .query("orderBy", ORDER_BY)
            .query("maxResults", &self.page_size.to_string());
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }
        let response = request.call()?;
        Ok(serde_json::from_reader(response.into_reader())?)
    }

    /// Fetch every account in the domain, following continuation tokens.
    ///
    /// Accounts are returned in page order. A page without a `users` array
    /// ends the listing with whatever was gathered so far.
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub fn list_all_accounts(&self) -> DirectoryResult<Vec<DirectoryAccount>> {
        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.list_page(page_token.as_deref())?;
            pages += 1;

            let Some(users) = page.users else {
                info!("no users found");
                break;
            };
            debug!(page = pages, received = users.len(), "fetched directory page");
            accounts.extend(users);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(pages, accounts = accounts.len(), "directory snapshot loaded");
        Ok(accounts)
    }

    /// Create a new account. Any 2xx status counts as created; the echoed
    /// body is not read.
    pub fn insert(&self, account: &DirectoryAccount) -> DirectoryResult<()> {
        self.agent
            .post(&self.users_url())
            .set("Authorization", &self.bearer())
            .send_json(account)?;
        Ok(())
    }

    /// Overwrite only the fields present in `patch` on the account keyed by `primary_email`.
    pub fn update(&self, patch: &AccountPatch, primary_email: &str) -> DirectoryResult<()> {
        self.agent
            .put(&self.user_url(primary_email))
            .set("Authorization", &self.bearer())
            .send_json(patch)?;
        Ok(())
    }

    // The key is one path segment; `/`, `?` and `#` must not reshape the request.
    fn user_url(&self, user_key: &str) -> String {
        format!("{}/{}", self.users_url(), urlencoding::encode(user_key))
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose())
    }
}
