//! Bearer token sources.

/// Supplies the ID token attached to every request.
pub trait TokenProvider: Send + Sync {
    /// The current token, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

/// A token fixed at construction time (from config or environment).
///
/// Note: Custom Debug impl masks the token.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(token.trim().to_string()))
        }
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticToken {
    fn from(token: Option<String>) -> Self {
        token.map(StaticToken::new).unwrap_or_default()
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = if self.0.is_some() { "***" } else { "<none>" };
        f.debug_tuple("StaticToken").field(&shown).finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_mean_signed_out() {
        assert_eq!(StaticToken::new("  ").token(), None);
        assert_eq!(StaticToken::from(None).token(), None);
        assert_eq!(StaticToken::new(" abc ").token().as_deref(), Some("abc"));
    }

    #[test]
    fn debug_masks_token() {
        let printed = format!("{:?}", StaticToken::new("secret-id-token"));
        assert!(!printed.contains("secret"));
        assert!(printed.contains("***"));
    }
}
