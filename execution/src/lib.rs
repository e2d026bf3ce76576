//! Vmgate execution layer.
//!
//! Translates messages emitted by sandboxed contracts ([`CosmosMsg`]) into the host
//! messages the chain executes ([`HostMessage`]). The primary entrypoint is
//! [`MessageEncoders`].
//!
//! ## Determinism requirements
//! - Identical inputs must produce byte-identical host messages on every validator.
//! - Amounts are parsed into arbitrary-precision integers; never use floats.
//! - Coin lists are emitted sorted by denomination.
//!
//! ## Minimal dispatch (example)
//! ```rust,ignore
//! use std::sync::Arc;
//! use vmgate_execution::{
//!     BasicGasMeter, FixedPortSource, MessageEncoders, SimpleContext, TypeRegistry,
//! };
//!
//! let encoders = MessageEncoders::new(
//!     Arc::new(TypeRegistry::with_defaults()),
//!     Arc::new(FixedPortSource::new("transfer")),
//! );
//! let mut ctx = SimpleContext::new(BasicGasMeter::new(1_000_000), 1);
//! let msgs = encoders.encode_json(&mut ctx, "cosmos1contract", "", raw_json)?;
//! ```
//!
//! [`CosmosMsg`]: vmgate_types::vm::CosmosMsg
//! [`HostMessage`]: vmgate_types::host::HostMessage

pub mod coins;
pub mod context;
pub mod encoders;
pub mod error;
pub mod unpacker;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use coins::{normalize_coin, normalize_coins};
pub use context::{
    BasicGasMeter, ExecutionContext, FixedPortSource, GasMeter, OutOfGas, SimpleContext,
    TransferPortSource, ANY_MSG_GAS_COST, DEFAULT_GAS_MULTIPLIER,
};
pub use encoders::{port_id_for_contract, MessageEncoders, PartialEncoders};
pub use error::EncodeError;
pub use unpacker::{AnyUnpacker, TypeRegistry, UnpackError, BUILTIN_TYPE_URLS, MAX_UNPACK_DEPTH};
