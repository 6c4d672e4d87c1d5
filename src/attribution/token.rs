use std::fmt;

use crate::attribution::privacy::anonymize_token;

/// Opaque token from `AAAttribution.attributionToken()`, good for one POST
/// to the attribution endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AttributionToken(String);

impl AttributionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Tokens end up in logs through `{:?}` on errors and spans; never print them whole.
impl fmt::Debug for AttributionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributionToken({})", anonymize_token(&self.0))
    }
}

impl fmt::Display for AttributionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&anonymize_token(&self.0))
    }
}

/// The OS token API (`AAAttribution`). Synchronous; an `Err` is the thrown
/// error's description.
pub trait AttributionTokenSource: Send + Sync {
    /// Whether the `AAAttribution` class resolves at runtime.
    fn is_service_available(&self) -> bool;

    fn attribution_token(&self) -> Result<String, String>;
}

/// Token source for hosts that mint the token themselves and hand it over.
pub struct ProvidedTokenSource {
    token: Option<String>,
}

impl ProvidedTokenSource {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl AttributionTokenSource for ProvidedTokenSource {
    fn is_service_available(&self) -> bool {
        self.token.is_some()
    }

    fn attribution_token(&self) -> Result<String, String> {
        match self.token.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Ok(t.to_string()),
            _ => Err("Host provided an empty attribution token".to_string()),
        }
    }
}
