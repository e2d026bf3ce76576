use crate::{
    context::{BasicGasMeter, ExecutionContext, FixedPortSource, GasMeter, OutOfGas},
    encoders::MessageEncoders,
    unpacker::TypeRegistry,
};
use std::sync::Arc;
use vmgate_types::{
    host::{Any, HostMessage, MsgClearAdmin},
    vm::{
        AnyMsg, BankMsg, Binary, Coin, CosmosMsg, DistributionMsg, GovMsg, Ibc2Msg, Ibc2Payload,
        IbcMsg, IbcTimeout, IbcTimeoutBlock, MessageKind, RawMessage, StakingMsg, Timestamp,
        VoteOption, WasmMsg,
    },
};

/// Port returned by the port source of [`create_encoders`].
pub const MOCK_TRANSFER_PORT: &str = "transfer";

/// Gas meter that records every successful charge.
#[derive(Clone, Debug)]
pub struct MockGasMeter {
    inner: BasicGasMeter,
    charges: Vec<(u64, String)>,
}

impl MockGasMeter {
    pub fn new(limit: u64) -> Self {
        Self {
            inner: BasicGasMeter::new(limit),
            charges: Vec::new(),
        }
    }
}

impl GasMeter for MockGasMeter {
    fn consume_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), OutOfGas> {
        self.inner.consume_gas(amount, descriptor)?;
        self.charges.push((amount, descriptor.to_string()));
        Ok(())
    }

    fn gas_consumed(&self) -> u64 {
        self.inner.gas_consumed()
    }

    fn gas_limit(&self) -> u64 {
        self.inner.gas_limit()
    }
}

#[derive(Clone, Debug)]
pub struct MockContext {
    meter: MockGasMeter,
    height: u64,
}

impl MockContext {
    pub fn new(gas_limit: u64) -> Self {
        Self {
            meter: MockGasMeter::new(gas_limit),
            height: 1,
        }
    }

    pub fn with_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    /// Charges recorded so far, in order.
    pub fn charges(&self) -> Vec<(u64, String)> {
        self.meter.charges.clone()
    }
}

impl ExecutionContext for MockContext {
    fn gas_meter(&mut self) -> &mut dyn GasMeter {
        &mut self.meter
    }

    fn block_height(&self) -> u64 {
        self.height
    }
}

/// Default encoders with every built-in type registered and a fixed transfer port.
pub fn create_encoders() -> MessageEncoders {
    MessageEncoders::new(
        Arc::new(TypeRegistry::with_defaults()),
        Arc::new(FixedPortSource::new(MOCK_TRANSFER_PORT)),
    )
}

/// A valid message of `kind` (custom messages carry an empty JSON object).
pub fn sample_message(kind: MessageKind) -> CosmosMsg {
    match kind {
        MessageKind::Bank => CosmosMsg::Bank(BankMsg::Send {
            to_address: "cosmos1recipient".to_string(),
            amount: vec![Coin::new("100", "stake")],
        }),
        MessageKind::Custom => CosmosMsg::Custom(RawMessage(b"{}".to_vec())),
        MessageKind::Distribution => {
            CosmosMsg::Distribution(DistributionMsg::WithdrawDelegatorReward {
                validator: "cosmosvaloper1validator".to_string(),
            })
        }
        MessageKind::Ibc => CosmosMsg::Ibc(IbcMsg::Transfer {
            channel_id: "channel-0".to_string(),
            to_address: "osmo1receiver".to_string(),
            amount: Coin::new("10", "stake"),
            timeout: IbcTimeout {
                block: Some(IbcTimeoutBlock {
                    revision: 1,
                    height: 100,
                }),
                timestamp: None,
            },
            memo: String::new(),
        }),
        MessageKind::Ibc2 => CosmosMsg::Ibc2(Ibc2Msg::SendPacket {
            source_client: "client-0".to_string(),
            payloads: vec![Ibc2Payload {
                source_port: "wasm.cosmos1contract".to_string(),
                destination_port: "wasm.osmo1contract".to_string(),
                version: "v1".to_string(),
                encoding: "application/json".to_string(),
                value: Binary::from(b"{}".as_slice()),
            }],
            timeout: Timestamp::from_nanos(1_700_000_000_000_000_000),
        }),
        MessageKind::Staking => CosmosMsg::Staking(StakingMsg::Delegate {
            validator: "cosmosvaloper1validator".to_string(),
            amount: Coin::new("5", "stake"),
        }),
        MessageKind::Any => {
            let any = Any::pack(&HostMessage::ClearAdmin(MsgClearAdmin {
                sender: "cosmos1contract".to_string(),
                contract: "cosmos1other".to_string(),
            }));
            CosmosMsg::Any(AnyMsg {
                type_url: any.type_url,
                value: Binary::from(any.value),
            })
        }
        MessageKind::Wasm => CosmosMsg::Wasm(WasmMsg::ClearAdmin {
            contract_addr: "cosmos1other".to_string(),
        }),
        MessageKind::Gov => CosmosMsg::Gov(GovMsg::Vote {
            proposal_id: 1,
            option: VoteOption::Yes,
        }),
    }
}
