//! Primary address derivation and initial password generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::AddressError;

/// Domain used when no `directory.domain` property is configured.
pub const DEFAULT_DOMAIN: &str = "aegee-delft.nl";

const PASSWORD_LEN: usize = 20;

/// `given + family` with all whitespace removed, lowercased, plus `@domain`.
///
/// Only called when an account is created; existing accounts keep their
/// address even when the source name changes.
pub fn derive_primary_address(
    given: &str,
    family: &str,
    domain: &str,
) -> Result<String, AddressError> {
    let local: String = given
        .chars()
        .chain(family.chars())
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if local.is_empty() {
        return Err(AddressError::InvalidName {
            given: given.to_owned(),
            family: family.to_owned(),
        });
    }

    Ok(format!("{local}@{}", domain.trim().to_lowercase()))
}

/// Random alphanumeric initial password. Users must change it on first login.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Jan", "Jansen", "janjansen@aegee-delft.nl")]
    #[case("JAN", "jansen", "janjansen@aegee-delft.nl")]
    #[case(" Jan ", "Jan sen", "janjansen@aegee-delft.nl")]
    #[case("Ada", "Lovelace", "adalovelace@aegee-delft.nl")]
    #[case("Anne Marie", "van der\tBerg", "annemarievanderberg@aegee-delft.nl")]
    fn derives_lowercase_stripped_address(
        #[case] given: &str,
        #[case] family: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            derive_primary_address(given, family, DEFAULT_DOMAIN).expect("derive"),
            expected
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_primary_address("Jan", "Jansen", DEFAULT_DOMAIN).expect("derive");
        let b = derive_primary_address("Jan", "Jansen", DEFAULT_DOMAIN).expect("derive");
        assert_eq!(a, b);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = derive_primary_address("  ", "\t", DEFAULT_DOMAIN).unwrap_err();
        assert!(matches!(err, AddressError::InvalidName { .. }));
    }

    #[test]
    fn passwords_are_alphanumeric_and_vary() {
        let a = generate_password();
        let b = generate_password();
        assert_eq!(a.len(), PASSWORD_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
