//! API key handling for the direct inference mode
//!
//! Keys come from the environment and are wrapped so they never reach logs.

use crate::ports::inference::InferenceError;
use std::env;
use std::fmt;

/// Primary environment variable for the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable, checked when the primary is unset or empty
pub const GOOGLE_AI_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

/// Variables consulted in order
pub const API_KEY_ENV_VARS: [&str; 2] = [GEMINI_API_KEY_ENV, GOOGLE_AI_API_KEY_ENV];

/// A wrapper for API keys that prevents accidental logging
///
/// The `Debug` and `Display` implementations mask the actual key value.
#[derive(Clone)]
pub struct SecretApiKey {
    key: String,
}

impl SecretApiKey {
    /// Creates a new SecretApiKey from a string
    ///
    /// # Returns
    /// * `Some(SecretApiKey)` if the key is non-empty after trimming
    /// * `None` if the key is empty or whitespace-only
    pub fn new(key: String) -> Option<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                key: trimmed.to_string(),
            })
        }
    }

    /// Returns the actual API key value
    ///
    /// Use this only when building the request. Never log the returned value.
    pub fn expose(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretApiKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

/// Loads provider keys from the environment
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Loads the Gemini API key from the process environment
    ///
    /// # Errors
    /// Returns `InferenceError::Unauthorized` if neither variable holds a key
    pub fn load_api_key() -> Result<SecretApiKey, InferenceError> {
        Self::load_api_key_with(|name| env::var(name).ok())
    }

    /// Loads the key through an arbitrary variable lookup
    ///
    /// The first variable in [`API_KEY_ENV_VARS`] with a non-blank value wins.
    pub fn load_api_key_with<F>(lookup: F) -> Result<SecretApiKey, InferenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find_map(SecretApiKey::new)
            .ok_or(InferenceError::Unauthorized)
    }

    /// Setup instructions shown when no key is configured
    pub fn missing_key_guidance() -> String {
        format!(
            r#"Gemini API key is not configured.

Set one of these environment variables:
   export {GEMINI_API_KEY_ENV}=your-api-key-here
   export {GOOGLE_AI_API_KEY_ENV}=your-api-key-here

Or switch to relay mode in ~/.binsight/config.toml:
   [classifier]
   mode = "relay"

Get a key at https://aistudio.google.com/"#
        )
    }

    /// Whether a key is available, without exposing it
    pub fn is_key_available() -> bool {
        Self::load_api_key().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    // === SecretApiKey Tests ===

    #[test]
    fn test_secret_api_key_rejects_blank() {
        assert!(SecretApiKey::new("".to_string()).is_none());
        assert!(SecretApiKey::new("   \t\n  ".to_string()).is_none());
    }

    #[test]
    fn test_secret_api_key_trims_whitespace() {
        let key = SecretApiKey::new("  AIza-test  ".to_string()).unwrap();
        assert_eq!(key.expose(), "AIza-test");
    }

    #[test]
    fn test_secret_api_key_redacted() {
        let key = SecretApiKey::new("super-secret-key".to_string()).unwrap();

        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("super-secret-key"));
        assert!(debug_str.contains("REDACTED"));

        let display_str = format!("{}", key);
        assert!(!display_str.contains("super-secret-key"));
        assert!(display_str.contains("REDACTED"));
    }

    // === ApiKeyManager Tests ===

    #[test]
    fn test_load_primary_variable() {
        let key = ApiKeyManager::load_api_key_with(lookup_from(&[
            (GEMINI_API_KEY_ENV, "primary"),
            (GOOGLE_AI_API_KEY_ENV, "fallback"),
        ]))
        .unwrap();
        assert_eq!(key.expose(), "primary");
    }

    #[test]
    fn test_load_falls_back_when_primary_missing() {
        let key =
            ApiKeyManager::load_api_key_with(lookup_from(&[(GOOGLE_AI_API_KEY_ENV, "fallback")]))
                .unwrap();
        assert_eq!(key.expose(), "fallback");
    }

    #[test]
    fn test_load_falls_back_when_primary_blank() {
        let key = ApiKeyManager::load_api_key_with(lookup_from(&[
            (GEMINI_API_KEY_ENV, "  "),
            (GOOGLE_AI_API_KEY_ENV, "fallback"),
        ]))
        .unwrap();
        assert_eq!(key.expose(), "fallback");
    }

    #[test]
    fn test_load_missing_is_unauthorized() {
        let result = ApiKeyManager::load_api_key_with(lookup_from(&[]));
        assert!(matches!(result, Err(InferenceError::Unauthorized)));
    }

    #[test]
    fn test_missing_key_guidance() {
        let guidance = ApiKeyManager::missing_key_guidance();
        assert!(guidance.contains("GEMINI_API_KEY"));
        assert!(guidance.contains("GOOGLE_AI_API_KEY"));
        assert!(guidance.contains("relay"));
    }
}
