//! Generic messages: a type URL plus an encoded host message.

use super::{AnyEncoder, EncodeResult};
use crate::{
    context::{ExecutionContext, ANY_MSG_GAS_COST},
    error::EncodeError,
    unpacker::AnyUnpacker,
};
use std::sync::Arc;
use vmgate_types::{host::Any, vm::AnyMsg};

/// Descriptor recorded with the unpacking charge.
pub const UNPACK_GAS_DESCRIPTOR: &str = "unpacking AnyMsg";

/// Builds an encoder that resolves payloads with `unpacker`, charging
/// `ANY_MSG_GAS_COST / gas_multiplier` host gas per message.
pub fn encoder(unpacker: Arc<dyn AnyUnpacker>, gas_multiplier: u64) -> AnyEncoder {
    Arc::new(
        move |ctx: &mut dyn ExecutionContext, _sender: &str, msg: &AnyMsg| -> EncodeResult {
            encode(unpacker.as_ref(), gas_multiplier, ctx, msg)
        },
    )
}

pub fn encode(
    unpacker: &dyn AnyUnpacker,
    gas_multiplier: u64,
    ctx: &mut dyn ExecutionContext,
    msg: &AnyMsg,
) -> EncodeResult {
    // Charged before decoding, also for payloads that fail to decode.
    ctx.gas_meter()
        .consume_gas(ANY_MSG_GAS_COST / gas_multiplier.max(1), UNPACK_GAS_DESCRIPTOR)?;

    let any = Any::new(msg.type_url.clone(), msg.value.as_slice().to_vec());
    let invalid = |source| EncodeError::InvalidPayload {
        type_url: msg.type_url.clone(),
        source,
    };
    let mut host = unpacker.unpack_any(&any).map_err(invalid)?;
    unpacker.unpack_interfaces(&mut host).map_err(invalid)?;
    Ok(vec![host])
}
