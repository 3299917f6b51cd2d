//! Identities asserted by the OAuth provider.
//!
//! A `ProviderCallback` is what the provider round-trip produced, before any
//! validation. An `ExternalIdentity` is a callback that passed validation and
//! can be matched to an internal user.

/// The provider-scoped account a sign-in came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLink {
    /// Provider name, e.g. "github".
    pub provider: String,
    /// Account id scoped to the provider.
    pub provider_account_id: String,
}

impl AccountLink {
    /// Creates an account link.
    #[must_use]
    pub fn new(provider: impl Into<String>, provider_account_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
        }
    }
}

/// Raw result of a provider round-trip.
///
/// Provider authenticity (state, PKCE) has already been checked by the time
/// one of these exists. Its content has not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCallback {
    /// The linked provider account, if the provider returned one.
    pub account: Option<AccountLink>,
    /// Email address, if the provider disclosed one.
    pub email: Option<String>,
    /// Display name, if any.
    pub display_name: Option<String>,
}

impl ProviderCallback {
    /// Creates a callback result for the given account.
    #[must_use]
    pub fn new(account: AccountLink) -> Self {
        Self {
            account: Some(account),
            email: None,
            display_name: None,
        }
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }
}

/// A validated identity asserted by the provider.
///
/// Exists only for the duration of a callback. It is never written into a
/// session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    provider: String,
    provider_account_id: String,
    email: String,
    display_name: Option<String>,
}

impl ExternalIdentity {
    pub(crate) fn new(
        account: AccountLink,
        email: String,
        display_name: Option<String>,
    ) -> Self {
        Self {
            provider: account.provider,
            provider_account_id: account.provider_account_id,
            email,
            display_name,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the provider-scoped account id.
    #[must_use]
    pub fn provider_account_id(&self) -> &str {
        &self.provider_account_id
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, if the provider supplied one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_callback_builder() {
        let callback = ProviderCallback::new(AccountLink::new("github", "583231"))
            .with_email(Some("octocat@github.com".to_string()))
            .with_display_name(Some("The Octocat".to_string()));

        let account = callback.account.as_ref().expect("account");
        assert_eq!(account.provider, "github");
        assert_eq!(account.provider_account_id, "583231");
        assert_eq!(callback.email.as_deref(), Some("octocat@github.com"));
        assert_eq!(callback.display_name.as_deref(), Some("The Octocat"));
    }

    #[test]
    fn default_callback_has_nothing() {
        let callback = ProviderCallback::default();
        assert!(callback.account.is_none());
        assert!(callback.email.is_none());
    }

    #[test]
    fn external_identity_accessors() {
        let identity = ExternalIdentity::new(
            AccountLink::new("github", "1"),
            "a@example.com".to_string(),
            None,
        );
        assert_eq!(identity.provider(), "github");
        assert_eq!(identity.provider_account_id(), "1");
        assert_eq!(identity.email(), "a@example.com");
        assert!(identity.display_name().is_none());
    }
}
