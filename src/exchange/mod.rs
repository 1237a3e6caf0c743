pub mod bter;
pub mod keys;
pub mod nonce;
pub mod pairs;
pub mod signing;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{TradeError, TransportError};
use crate::types::PriceKind;

pub use bter::BterConnection;
pub use keys::KeyHandler;
pub use nonce::{IncreasingNonce, NonceProvider};
pub use pairs::{PairConfig, PairTable};
pub use signing::{Envelope, SignedClient};

/// Carries a signed POST to the exchange and hands back the decoded JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        path: &str,
        headers: &[(&str, String)],
        body: &str,
    ) -> Result<Value, TransportError>;
}

/// Looks up the secret belonging to a public API key.
pub trait SecretStore {
    fn get_secret(&self, key: &str) -> Result<Vec<u8>, TradeError>;
}

/// Pair validation and pair-specific decimal formatting.
pub trait PairRules: Send + Sync {
    fn validate_pair(&self, pair: &str) -> Result<(), TradeError>;

    fn format_amount(&self, value: Decimal, pair: &str, kind: PriceKind)
        -> Result<String, TradeError>;
}
