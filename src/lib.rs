//! Client for the private trading endpoints of the BTER exchange.
//!
//! [`TradeApi`] covers balances, order placement, order status and
//! cancellation. Requests go through [`exchange::SignedClient`], which adds a
//! nonce, signs the form body with HMAC-SHA512 and interprets the `result`
//! envelope. The HTTP transport, secret lookup and pair rules sit behind the
//! [`exchange::Transport`], [`exchange::SecretStore`] and [`exchange::PairRules`]
//! traits.

pub mod config;
pub mod error;
pub mod exchange;
pub mod trading;
pub mod types;

pub use error::{TradeError, TransportError};
pub use trading::{OrderItem, OrderRef, TradeApi, ALREADY_FILLED_ERROR};
pub use types::{Balance, Balances, OrderSide, PriceKind};
