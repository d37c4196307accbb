//! Identifier parsing.
//!
//! Requested identifiers look like `acct:bob@example.com`. Directory and SQL
//! drivers each extract their own lookup key from the part after the scheme;
//! an identifier that does not have the expected shape is reported as not
//! found by the caller.

use serde::{Deserialize, Serialize};

/// How requested identifiers are validated before lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierPolicy {
    /// The accepted scheme, without the trailing colon.
    pub scheme: String,

    /// Reject identifiers whose scheme differs from `scheme`.
    ///
    /// When false, any scheme prefix is stripped and a bare `user@host` is
    /// accepted.
    pub enforce_scheme: bool,
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        Self {
            scheme: "acct".to_string(),
            enforce_scheme: true,
        }
    }
}

impl IdentifierPolicy {
    /// Policy that accepts any scheme, or none.
    pub fn lenient() -> Self {
        Self {
            enforce_scheme: false,
            ..Default::default()
        }
    }

    /// The part of the identifier after the scheme.
    pub fn local_part<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        let rest = match identifier.split_once(':') {
            Some((scheme, rest)) => {
                if self.enforce_scheme && !scheme.eq_ignore_ascii_case(&self.scheme) {
                    return None;
                }
                rest
            }
            None if self.enforce_scheme => return None,
            None => identifier,
        };

        (!rest.is_empty()).then_some(rest)
    }

    /// Directory lookup key: the user name before the first `@`.
    ///
    /// `acct:bob@example.com` yields `bob`.
    pub fn directory_key<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        let rest = self.local_part(identifier)?;
        let user = rest.split('@').next().unwrap_or_default();
        (!user.is_empty()).then_some(user)
    }

    /// Account lookup key: the whole `user@host` address.
    ///
    /// The user part may itself contain `@`; the host is whatever follows the
    /// last one. Both sides must be non-empty.
    pub fn account_key<'a>(&self, identifier: &'a str) -> Option<&'a str> {
        let rest = self.local_part(identifier)?;
        let at = rest.rfind('@')?;
        (at > 0 && at + 1 < rest.len()).then_some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_part_enforced() {
        let policy = IdentifierPolicy::default();

        assert_eq!(policy.local_part("acct:bob@foobar.com"), Some("bob@foobar.com"));
        assert_eq!(policy.local_part("ACCT:bob@foobar.com"), Some("bob@foobar.com"));
        assert_eq!(policy.local_part("mailto:bob@foobar.com"), None);
        assert_eq!(policy.local_part("bob@foobar.com"), None);
        assert_eq!(policy.local_part("acct:"), None);
        assert_eq!(policy.local_part("missingno"), None);
    }

    #[test]
    fn test_local_part_lenient() {
        let policy = IdentifierPolicy::lenient();

        assert_eq!(policy.local_part("acct:bob@foobar.com"), Some("bob@foobar.com"));
        assert_eq!(policy.local_part("mailto:bob@foobar.com"), Some("bob@foobar.com"));
        assert_eq!(policy.local_part("bob@foobar.com"), Some("bob@foobar.com"));
        assert_eq!(policy.local_part(""), None);
    }

    #[test]
    fn test_custom_scheme() {
        let policy = IdentifierPolicy {
            scheme: "user".to_string(),
            enforce_scheme: true,
        };

        assert_eq!(policy.directory_key("user:bob@foobar.com"), Some("bob"));
        assert_eq!(policy.directory_key("acct:bob@foobar.com"), None);
    }

    #[test]
    fn test_directory_key() {
        let policy = IdentifierPolicy::default();

        assert_eq!(policy.directory_key("acct:bob@foobar.com"), Some("bob"));
        assert_eq!(policy.directory_key("acct:bob"), Some("bob"));
        assert_eq!(policy.directory_key("acct:@foobar.com"), None);
        assert_eq!(policy.directory_key("missingno"), None);
    }

    #[test]
    fn test_account_key() {
        let policy = IdentifierPolicy::default();

        assert_eq!(policy.account_key("acct:bob@example.com"), Some("bob@example.com"));
        assert_eq!(
            policy.account_key("acct:bob@home@example.com"),
            Some("bob@home@example.com")
        );
        assert_eq!(policy.account_key("acct:bob"), None);
        assert_eq!(policy.account_key("acct:@example.com"), None);
        assert_eq!(policy.account_key("acct:bob@"), None);
        assert_eq!(policy.account_key("bob@example.com"), None);
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: IdentifierPolicy = serde_yaml::from_str("enforce_scheme: false").unwrap();
        assert_eq!(policy.scheme, "acct");
        assert!(!policy.enforce_scheme);
    }
}
