use std::collections::HashMap;
use std::fmt;

use super::SecretStore;
use crate::error::TradeError;

/// In-memory key/secret store.
#[derive(Default, Clone)]
pub struct KeyHandler {
    secrets: HashMap<String, Vec<u8>>,
}

impl KeyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&mut self, key: impl Into<String>, secret: impl Into<Vec<u8>>) {
        self.secrets.insert(key.into(), secret.into());
    }
}

impl SecretStore for KeyHandler {
    fn get_secret(&self, key: &str) -> Result<Vec<u8>, TradeError> {
        self.secrets
            .get(key)
            .cloned()
            .ok_or_else(|| TradeError::config(format!("no secret stored for key {}", key)))
    }
}

// Secrets stay out of logs.
impl fmt::Debug for KeyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandler")
            .field("keys", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut handler = KeyHandler::new();
        handler.add_key("pub", "s3cret");
        assert_eq!(handler.get_secret("pub").unwrap(), b"s3cret".to_vec());
        assert!(matches!(
            handler.get_secret("missing"),
            Err(TradeError::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let mut handler = KeyHandler::new();
        handler.add_key("pub", "s3cret");
        let shown = format!("{:?}", handler);
        assert!(shown.contains("pub"));
        assert!(!shown.contains("s3cret"));
    }
}
