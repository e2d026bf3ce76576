//! Second-generation inter-chain packets.

use super::EncodeResult;
use vmgate_types::{
    host::{HostMessage, MsgSendPacket, Payload},
    vm::Ibc2Msg,
};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// The packet timeout is converted from nanoseconds to whole seconds, dropping any
/// sub-second remainder.
pub fn encode(sender: &str, msg: &Ibc2Msg) -> EncodeResult {
    match msg {
        Ibc2Msg::SendPacket {
            source_client,
            payloads,
            timeout,
        } => Ok(vec![HostMessage::SendPacket(MsgSendPacket {
            source_client: source_client.clone(),
            timeout_timestamp: timeout.nanos() / NANOS_PER_SECOND,
            payloads: payloads
                .iter()
                .map(|payload| Payload {
                    source_port: payload.source_port.clone(),
                    destination_port: payload.destination_port.clone(),
                    version: payload.version.clone(),
                    encoding: payload.encoding.clone(),
                    value: payload.value.as_slice().to_vec(),
                })
                .collect(),
            signer: sender.to_string(),
        })]),
    }
}
