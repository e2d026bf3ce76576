use super::EncodeResult;
use crate::coins::normalize_coins;
use vmgate_types::{
    host::{HostMessage, MsgFundCommunityPool, MsgSetWithdrawAddress, MsgWithdrawDelegatorReward},
    vm::DistributionMsg,
};

pub fn encode(sender: &str, msg: &DistributionMsg) -> EncodeResult {
    let msg = match msg {
        DistributionMsg::SetWithdrawAddress { address } => {
            HostMessage::SetWithdrawAddress(MsgSetWithdrawAddress {
                delegator_address: sender.to_string(),
                withdraw_address: address.clone(),
            })
        }
        DistributionMsg::WithdrawDelegatorReward { validator } => {
            HostMessage::WithdrawDelegatorReward(MsgWithdrawDelegatorReward {
                delegator_address: sender.to_string(),
                validator_address: validator.clone(),
            })
        }
        DistributionMsg::FundCommunityPool { amount } => {
            HostMessage::FundCommunityPool(MsgFundCommunityPool {
                depositor: sender.to_string(),
                amount: normalize_coins(amount)?,
            })
        }
    };
    Ok(vec![msg])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use vmgate_types::vm::Coin;

    #[test]
    fn set_withdraw_address() {
        let msgs = encode(
            "cosmos1delegator",
            &DistributionMsg::SetWithdrawAddress {
                address: "cosmos1withdraw".to_string(),
            },
        )
        .expect("valid");
        assert_eq!(
            msgs,
            vec![HostMessage::SetWithdrawAddress(MsgSetWithdrawAddress {
                delegator_address: "cosmos1delegator".to_string(),
                withdraw_address: "cosmos1withdraw".to_string(),
            })]
        );
    }

    #[test]
    fn withdraw_reward() {
        let msgs = encode(
            "cosmos1delegator",
            &DistributionMsg::WithdrawDelegatorReward {
                validator: "cosmosvaloper1v".to_string(),
            },
        )
        .expect("valid");
        assert_eq!(
            msgs,
            vec![HostMessage::WithdrawDelegatorReward(MsgWithdrawDelegatorReward {
                delegator_address: "cosmos1delegator".to_string(),
                validator_address: "cosmosvaloper1v".to_string(),
            })]
        );
    }

    #[test]
    fn fund_community_pool_allows_empty_amount() {
        let msgs = encode(
            "cosmos1depositor",
            &DistributionMsg::FundCommunityPool { amount: vec![] },
        )
        .expect("empty amount is valid");
        let HostMessage::FundCommunityPool(fund) = &msgs[0] else {
            panic!("expected fund community pool");
        };
        assert!(fund.amount.is_empty());
    }

    #[test]
    fn fund_community_pool_rejects_bad_amount() {
        let err = encode(
            "cosmos1depositor",
            &DistributionMsg::FundCommunityPool {
                amount: vec![Coin::new("1.5", "stake")],
            },
        )
        .expect_err("fractional amount");
        assert!(matches!(err, EncodeError::AmountParse { .. }));
    }
}
