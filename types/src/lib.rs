pub mod codec;
pub mod coin;
pub mod decimal;
pub mod host;
pub mod vm;

pub use coin::{is_valid_denom, parse_amount, Coin, Coins};
pub use commonware_cryptography::sha256::Digest;
pub use decimal::{Decimal, DecimalError};
pub use host::{messages_digest, Any, HostMessage};
pub use vm::{decode_cosmos_msg, CosmosMsg, DecodeError, MessageKind};

#[cfg(test)]
mod compat;
