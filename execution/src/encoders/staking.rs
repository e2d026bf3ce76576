use super::EncodeResult;
use crate::coins::normalize_coin;
use vmgate_types::{
    host::{HostMessage, MsgBeginRedelegate, MsgDelegate, MsgUndelegate},
    vm::StakingMsg,
};

pub fn encode(sender: &str, msg: &StakingMsg) -> EncodeResult {
    let msg = match msg {
        StakingMsg::Delegate { validator, amount } => HostMessage::Delegate(MsgDelegate {
            delegator_address: sender.to_string(),
            validator_address: validator.clone(),
            amount: normalize_coin(amount)?,
        }),
        StakingMsg::Redelegate {
            src_validator,
            dst_validator,
            amount,
        } => HostMessage::BeginRedelegate(MsgBeginRedelegate {
            delegator_address: sender.to_string(),
            validator_src_address: src_validator.clone(),
            validator_dst_address: dst_validator.clone(),
            amount: normalize_coin(amount)?,
        }),
        StakingMsg::Undelegate { validator, amount } => HostMessage::Undelegate(MsgUndelegate {
            delegator_address: sender.to_string(),
            validator_address: validator.clone(),
            amount: normalize_coin(amount)?,
        }),
    };
    Ok(vec![msg])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use vmgate_types::{coin, vm::Coin};

    #[test]
    fn delegate() {
        let msgs = encode(
            "cosmos1delegator",
            &StakingMsg::Delegate {
                validator: "cosmosvaloper1v".to_string(),
                amount: Coin::new("777", "stake"),
            },
        )
        .expect("valid");
        assert_eq!(
            msgs,
            vec![HostMessage::Delegate(MsgDelegate {
                delegator_address: "cosmos1delegator".to_string(),
                validator_address: "cosmosvaloper1v".to_string(),
                amount: coin::Coin::new("stake", 777u32),
            })]
        );
    }

    #[test]
    fn redelegate_maps_both_validators() {
        let msgs = encode(
            "cosmos1delegator",
            &StakingMsg::Redelegate {
                src_validator: "cosmosvaloper1src".to_string(),
                dst_validator: "cosmosvaloper1dst".to_string(),
                amount: Coin::new("1", "stake"),
            },
        )
        .expect("valid");
        let HostMessage::BeginRedelegate(redelegate) = &msgs[0] else {
            panic!("expected redelegate");
        };
        assert_eq!(redelegate.validator_src_address, "cosmosvaloper1src");
        assert_eq!(redelegate.validator_dst_address, "cosmosvaloper1dst");
    }

    #[test]
    fn undelegate_rejects_bad_amount() {
        let err = encode(
            "cosmos1delegator",
            &StakingMsg::Undelegate {
                validator: "cosmosvaloper1v".to_string(),
                amount: Coin::new("", "stake"),
            },
        )
        .expect_err("empty amount");
        assert!(matches!(err, EncodeError::AmountParse { .. }));
    }
}
