use super::EncodeResult;
use crate::error::EncodeError;
use vmgate_types::vm::RawMessage;

/// Default for chain-specific messages: chains that accept them install their own encoder.
pub fn reject(_sender: &str, _msg: &RawMessage) -> EncodeResult {
    Err(EncodeError::unknown("custom variant not supported"))
}
