use super::EncodeResult;
use crate::{coins::normalize_coins, error::EncodeError};
use vmgate_types::{
    host::{HostMessage, MsgSend},
    vm::BankMsg,
};

/// Encodes value transfers. Only `send` is supported.
pub fn encode(sender: &str, msg: &BankMsg) -> EncodeResult {
    match msg {
        BankMsg::Send { to_address, amount } => {
            if amount.is_empty() {
                return Ok(vec![]);
            }
            let amount = normalize_coins(amount)?;
            Ok(vec![HostMessage::Send(MsgSend {
                from_address: sender.to_string(),
                to_address: to_address.clone(),
                amount,
            })])
        }
        BankMsg::Burn { .. } => Err(EncodeError::unknown("unknown variant of Bank")),
    }
}
