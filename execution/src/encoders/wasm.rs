use super::EncodeResult;
use crate::coins::normalize_coins;
use vmgate_types::{
    host::{
        HostMessage, MsgClearAdmin, MsgExecuteContract, MsgInstantiateContract,
        MsgInstantiateContract2, MsgMigrateContract, MsgUpdateAdmin,
    },
    vm::WasmMsg,
};

/// Encodes calls into other contracts. The calling contract is always the sender.
pub fn encode(sender: &str, msg: &WasmMsg) -> EncodeResult {
    let msg = match msg {
        WasmMsg::Execute {
            contract_addr,
            msg,
            funds,
        } => HostMessage::ExecuteContract(MsgExecuteContract {
            sender: sender.to_string(),
            contract: contract_addr.clone(),
            msg: msg.as_slice().to_vec(),
            funds: normalize_coins(funds)?,
        }),
        WasmMsg::Instantiate {
            admin,
            code_id,
            msg,
            funds,
            label,
        } => HostMessage::InstantiateContract(MsgInstantiateContract {
            sender: sender.to_string(),
            admin: admin.clone(),
            code_id: *code_id,
            label: label.clone(),
            msg: msg.as_slice().to_vec(),
            funds: normalize_coins(funds)?,
        }),
        WasmMsg::Instantiate2 {
            admin,
            code_id,
            label,
            msg,
            funds,
            salt,
        } => HostMessage::InstantiateContract2(MsgInstantiateContract2 {
            sender: sender.to_string(),
            admin: admin.clone(),
            code_id: *code_id,
            label: label.clone(),
            msg: msg.as_slice().to_vec(),
            funds: normalize_coins(funds)?,
            salt: salt.as_slice().to_vec(),
            fix_msg: false,
        }),
        WasmMsg::Migrate {
            contract_addr,
            new_code_id,
            msg,
        } => HostMessage::MigrateContract(MsgMigrateContract {
            sender: sender.to_string(),
            contract: contract_addr.clone(),
            code_id: *new_code_id,
            msg: msg.as_slice().to_vec(),
        }),
        WasmMsg::UpdateAdmin {
            contract_addr,
            admin,
        } => HostMessage::UpdateAdmin(MsgUpdateAdmin {
            sender: sender.to_string(),
            new_admin: admin.clone(),
            contract: contract_addr.clone(),
        }),
        WasmMsg::ClearAdmin { contract_addr } => HostMessage::ClearAdmin(MsgClearAdmin {
            sender: sender.to_string(),
            contract: contract_addr.clone(),
        }),
    };
    Ok(vec![msg])
}
