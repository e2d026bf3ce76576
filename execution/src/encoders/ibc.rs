//! First-generation inter-chain channel messages.

use super::{port_id_for_contract, EncodeResult, IbcEncoder};
use crate::{
    coins::normalize_coin,
    context::{ExecutionContext, TransferPortSource},
    error::EncodeError,
};
use std::sync::Arc;
use vmgate_types::{
    host::{Height, HostMessage, MsgChannelCloseInit, MsgTransfer},
    vm::{IbcMsg, IbcTimeoutBlock},
};

pub fn encoder(port_source: Arc<dyn TransferPortSource>) -> IbcEncoder {
    Arc::new(
        move |ctx: &mut dyn ExecutionContext,
              sender: &str,
              contract_ibc_port_id: &str,
              msg: &IbcMsg|
              -> EncodeResult {
            encode(port_source.as_ref(), ctx, sender, contract_ibc_port_id, msg)
        },
    )
}

/// Channel closes always use the sender's own port; `contract_ibc_port_id` is
/// accepted for encoders that route differently.
pub fn encode(
    port_source: &dyn TransferPortSource,
    ctx: &mut dyn ExecutionContext,
    sender: &str,
    _contract_ibc_port_id: &str,
    msg: &IbcMsg,
) -> EncodeResult {
    match msg {
        IbcMsg::CloseChannel { channel_id } => {
            Ok(vec![HostMessage::ChannelCloseInit(MsgChannelCloseInit {
                port_id: port_id_for_contract(sender),
                channel_id: channel_id.clone(),
                signer: sender.to_string(),
            })])
        }
        IbcMsg::Transfer {
            channel_id,
            to_address,
            amount,
            timeout,
            memo,
        } => {
            let token = normalize_coin(amount)?;
            Ok(vec![HostMessage::Transfer(MsgTransfer {
                source_port: port_source.port(&*ctx),
                source_channel: channel_id.clone(),
                token,
                sender: sender.to_string(),
                receiver: to_address.clone(),
                timeout_height: timeout_height(timeout.block),
                timeout_timestamp: timeout.timestamp.map(|ts| ts.nanos()).unwrap_or(0),
                memo: memo.clone(),
            })])
        }
        IbcMsg::PayPacketFee { .. } => Err(EncodeError::UnsupportedFeature("pay packet fee")),
        IbcMsg::PayPacketFeeAsync { .. } => {
            Err(EncodeError::UnsupportedFeature("pay packet fee async"))
        }
    }
}

fn timeout_height(block: Option<IbcTimeoutBlock>) -> Height {
    block
        .map(|block| Height::new(block.revision, block.height))
        .unwrap_or_default()
}
