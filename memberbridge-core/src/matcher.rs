//! Join between membership records and directory accounts.

use crate::types::{DirectoryAccount, MemberCode};

/// The first account whose reserved external identifier equals `code`.
///
/// Linear scan over the snapshot fetched once per pass. Blank codes never
/// match, so accounts without an identifier are not claimed by members
/// without a code.
pub fn find_by_code<'a>(
    accounts: &'a [DirectoryAccount],
    code: &MemberCode,
) -> Option<&'a DirectoryAccount> {
    if code.is_empty() {
        return None;
    }
    accounts
        .iter()
        .find(|account| account.conscribo_ids().any(|id| id == code.as_str()))
}
