//! Shared state for request handlers.

use std::sync::Arc;

use formcraft_core::signing::TokenSigner;
use formcraft_core::{FormcraftError, FormcraftResult, Settings};
use formcraft_forms::widgets::AuxContext;
use formcraft_store::InMemoryFormStore;

/// Everything a handler needs: the store, the token signer and the settings.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Form documents and submission logs.
    pub store: InMemoryFormStore,
    /// Verifies principal tokens.
    pub signer: TokenSigner,
    /// The loaded settings.
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Creates the state. Fails if no secret key is configured.
    pub fn new(settings: Settings, store: InMemoryFormStore) -> FormcraftResult<Self> {
        if settings.secret_key.is_empty() {
            return Err(FormcraftError::ConfigurationError(
                "secret_key must be set to verify principal tokens".to_string(),
            ));
        }
        Ok(Self {
            store,
            signer: TokenSigner::from_settings(&settings),
            settings: Arc::new(settings),
        })
    }

    /// Returns a fresh auxiliary context for one form render.
    pub fn aux(&self) -> AuxContext {
        AuxContext::new(self.settings.dropzone.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_secret_key() {
        let err = AppState::new(Settings::default(), InMemoryFormStore::new()).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_signer_accepts_fallback_keys() {
        let token = TokenSigner::new("retired").issue("u1").unwrap();
        let settings = Settings {
            secret_key: "current".into(),
            secret_key_fallbacks: vec!["retired".into()],
            ..Settings::default()
        };
        let state = AppState::new(settings, InMemoryFormStore::new()).unwrap();
        assert_eq!(state.signer.verify(&token, Some(60)).unwrap(), "u1");
    }

    #[test]
    fn test_aux_uses_dropzone_settings() {
        let mut settings = Settings {
            secret_key: "k".into(),
            ..Settings::default()
        };
        settings.dropzone.max_files = 2;
        let state = AppState::new(settings, InMemoryFormStore::new()).unwrap();
        assert_eq!(state.aux().dropzone.max_files, 2);
    }
}
