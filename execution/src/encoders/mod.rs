//! Per-kind encoders and the registry that dispatches to them.
//!
//! A [`MessageEncoders`] holds one encoder per [`MessageKind`]. Chains start from the
//! defaults and override individual kinds with [`PartialEncoders`].

pub mod any;
pub mod bank;
pub mod custom;
pub mod distribution;
pub mod gov;
pub mod ibc;
pub mod ibc2;
pub mod staking;
pub mod wasm;

use crate::{
    context::{ExecutionContext, TransferPortSource, DEFAULT_GAS_MULTIPLIER},
    error::EncodeError,
    unpacker::AnyUnpacker,
};
use std::{fmt, sync::Arc};
use tracing::{debug, warn};
use vmgate_types::{
    host::HostMessage,
    vm::{
        decode_cosmos_msg, AnyMsg, BankMsg, CosmosMsg, DistributionMsg, GovMsg, Ibc2Msg, IbcMsg,
        MessageKind, RawMessage, StakingMsg, WasmMsg,
    },
};

pub type EncodeResult = Result<Vec<HostMessage>, EncodeError>;

pub type BankEncoder = Arc<dyn Fn(&str, &BankMsg) -> EncodeResult + Send + Sync>;
pub type CustomEncoder = Arc<dyn Fn(&str, &RawMessage) -> EncodeResult + Send + Sync>;
pub type DistributionEncoder = Arc<dyn Fn(&str, &DistributionMsg) -> EncodeResult + Send + Sync>;
pub type IbcEncoder =
    Arc<dyn Fn(&mut dyn ExecutionContext, &str, &str, &IbcMsg) -> EncodeResult + Send + Sync>;
pub type Ibc2Encoder = Arc<dyn Fn(&str, &Ibc2Msg) -> EncodeResult + Send + Sync>;
pub type StakingEncoder = Arc<dyn Fn(&str, &StakingMsg) -> EncodeResult + Send + Sync>;
pub type AnyEncoder =
    Arc<dyn Fn(&mut dyn ExecutionContext, &str, &AnyMsg) -> EncodeResult + Send + Sync>;
pub type WasmEncoder = Arc<dyn Fn(&str, &WasmMsg) -> EncodeResult + Send + Sync>;
pub type GovEncoder = Arc<dyn Fn(&str, &GovMsg) -> EncodeResult + Send + Sync>;

/// Port owned by a contract for channel operations.
pub fn port_id_for_contract(contract_addr: &str) -> String {
    format!("wasm.{contract_addr}")
}

/// One encoder per message kind. Cloning is cheap.
#[derive(Clone)]
pub struct MessageEncoders {
    pub bank: BankEncoder,
    pub custom: CustomEncoder,
    pub distribution: DistributionEncoder,
    pub ibc: IbcEncoder,
    pub ibc2: Ibc2Encoder,
    pub staking: StakingEncoder,
    pub any: AnyEncoder,
    pub wasm: WasmEncoder,
    pub gov: GovEncoder,
}

/// Overrides for a subset of kinds. Unset kinds keep the base encoder on merge.
#[derive(Clone, Default)]
pub struct PartialEncoders {
    pub bank: Option<BankEncoder>,
    pub custom: Option<CustomEncoder>,
    pub distribution: Option<DistributionEncoder>,
    pub ibc: Option<IbcEncoder>,
    pub ibc2: Option<Ibc2Encoder>,
    pub staking: Option<StakingEncoder>,
    pub any: Option<AnyEncoder>,
    pub wasm: Option<WasmEncoder>,
    pub gov: Option<GovEncoder>,
}

impl PartialEncoders {
    /// An override that rejects every message of `kind`.
    pub fn reject(kind: MessageKind) -> Self {
        let reason = format!("{kind} messages are disabled");
        let mut partial = Self::default();
        match kind {
            MessageKind::Bank => {
                partial.bank = Some(Arc::new(move |_: &str, _: &BankMsg| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
            MessageKind::Custom => {
                partial.custom = Some(Arc::new(move |_: &str, _: &RawMessage| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
            MessageKind::Distribution => {
                partial.distribution = Some(Arc::new(
                    move |_: &str, _: &DistributionMsg| -> EncodeResult {
                        Err(EncodeError::unknown(reason.clone()))
                    },
                ))
            }
            MessageKind::Ibc => {
                partial.ibc = Some(Arc::new(
                    move |_: &mut dyn ExecutionContext,
                          _: &str,
                          _: &str,
                          _: &IbcMsg|
                          -> EncodeResult { Err(EncodeError::unknown(reason.clone())) },
                ))
            }
            MessageKind::Ibc2 => {
                partial.ibc2 = Some(Arc::new(move |_: &str, _: &Ibc2Msg| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
            MessageKind::Staking => {
                partial.staking = Some(Arc::new(move |_: &str, _: &StakingMsg| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
            MessageKind::Any => {
                partial.any = Some(Arc::new(
                    move |_: &mut dyn ExecutionContext, _: &str, _: &AnyMsg| -> EncodeResult {
                        Err(EncodeError::unknown(reason.clone()))
                    },
                ))
            }
            MessageKind::Wasm => {
                partial.wasm = Some(Arc::new(move |_: &str, _: &WasmMsg| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
            MessageKind::Gov => {
                partial.gov = Some(Arc::new(move |_: &str, _: &GovMsg| -> EncodeResult {
                    Err(EncodeError::unknown(reason.clone()))
                }))
            }
        }
        partial
    }

    pub fn is_empty(&self) -> bool {
        self.overridden().is_empty()
    }

    /// Kinds this override replaces.
    pub fn overridden(&self) -> Vec<MessageKind> {
        let slots = [
            (MessageKind::Bank, self.bank.is_some()),
            (MessageKind::Custom, self.custom.is_some()),
            (MessageKind::Distribution, self.distribution.is_some()),
            (MessageKind::Ibc, self.ibc.is_some()),
            (MessageKind::Ibc2, self.ibc2.is_some()),
            (MessageKind::Staking, self.staking.is_some()),
            (MessageKind::Any, self.any.is_some()),
            (MessageKind::Wasm, self.wasm.is_some()),
            (MessageKind::Gov, self.gov.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(kind, set)| set.then_some(kind))
            .collect()
    }
}

impl MessageEncoders {
    /// The default encoders. `unpacker` resolves generic messages and `port_source`
    /// supplies the source port of token transfers.
    pub fn new(
        unpacker: Arc<dyn AnyUnpacker>,
        port_source: Arc<dyn TransferPortSource>,
    ) -> Self {
        Self {
            bank: Arc::new(bank::encode),
            custom: Arc::new(custom::reject),
            distribution: Arc::new(distribution::encode),
            ibc: ibc::encoder(port_source),
            ibc2: Arc::new(ibc2::encode),
            staking: Arc::new(staking::encode),
            any: any::encoder(unpacker, DEFAULT_GAS_MULTIPLIER),
            wasm: Arc::new(wasm::encode),
            gov: Arc::new(gov::encode),
        }
    }

    /// Replaces every encoder set in `overrides`, keeping the rest.
    pub fn merge(mut self, overrides: Option<PartialEncoders>) -> Self {
        let Some(overrides) = overrides else {
            return self;
        };
        if let Some(bank) = overrides.bank {
            self.bank = bank;
        }
        if let Some(custom) = overrides.custom {
            self.custom = custom;
        }
        if let Some(distribution) = overrides.distribution {
            self.distribution = distribution;
        }
        if let Some(ibc) = overrides.ibc {
            self.ibc = ibc;
        }
        if let Some(ibc2) = overrides.ibc2 {
            self.ibc2 = ibc2;
        }
        if let Some(staking) = overrides.staking {
            self.staking = staking;
        }
        if let Some(any) = overrides.any {
            self.any = any;
        }
        if let Some(wasm) = overrides.wasm {
            self.wasm = wasm;
        }
        if let Some(gov) = overrides.gov {
            self.gov = gov;
        }
        self
    }

    /// Converts one contract message into host messages.
    ///
    /// `contract_addr` becomes the sender of every produced message.
    pub fn encode(
        &self,
        ctx: &mut dyn ExecutionContext,
        contract_addr: &str,
        contract_ibc_port_id: &str,
        msg: &CosmosMsg,
    ) -> EncodeResult {
        let kind = msg.kind();
        let result = match msg {
            CosmosMsg::Bank(msg) => (self.bank)(contract_addr, msg),
            CosmosMsg::Custom(msg) => (self.custom)(contract_addr, msg),
            CosmosMsg::Distribution(msg) => (self.distribution)(contract_addr, msg),
            CosmosMsg::Ibc(msg) => (self.ibc)(ctx, contract_addr, contract_ibc_port_id, msg),
            CosmosMsg::Ibc2(msg) => (self.ibc2)(contract_addr, msg),
            CosmosMsg::Staking(msg) => (self.staking)(contract_addr, msg),
            CosmosMsg::Any(msg) => (self.any)(ctx, contract_addr, msg),
            CosmosMsg::Wasm(msg) => (self.wasm)(contract_addr, msg),
            CosmosMsg::Gov(msg) => (self.gov)(contract_addr, msg),
        };
        match &result {
            Ok(msgs) => debug!(%kind, messages = msgs.len(), "encoded contract message"),
            Err(err) => warn!(
                %kind,
                contract = contract_addr,
                reason = err.code(),
                %err,
                "rejected contract message"
            ),
        }
        result
    }

    /// Decodes a JSON contract message and encodes it.
    pub fn encode_json(
        &self,
        ctx: &mut dyn ExecutionContext,
        contract_addr: &str,
        contract_ibc_port_id: &str,
        raw: &[u8],
    ) -> EncodeResult {
        let msg = decode_cosmos_msg(raw).map_err(|err| {
            warn!(contract = contract_addr, %err, "undecodable contract message");
            EncodeError::UnknownKind(err.to_string())
        })?;
        self.encode(ctx, contract_addr, contract_ibc_port_id, &msg)
    }
}

impl fmt::Debug for MessageEncoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEncoders").finish_non_exhaustive()
    }
}

impl fmt::Debug for PartialEncoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialEncoders")
            .field("overridden", &self.overridden())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_encoders, sample_message, MockContext};
    use proptest::prelude::*;
    use vmgate_types::{
        host::MsgSend,
        vm::{self, BankMsg},
    };

    const CONTRACT: &str = "cosmos1contract";

    fn bank_send(amount: &str) -> CosmosMsg {
        CosmosMsg::Bank(BankMsg::Send {
            to_address: "cosmos1recipient".to_string(),
            amount: vec![vm::Coin::new(amount, "stake")],
        })
    }

    fn constant_bank() -> BankEncoder {
        Arc::new(|_: &str, _: &BankMsg| -> EncodeResult { Ok(vec![]) })
    }

    #[test]
    fn contract_port() {
        assert_eq!(port_id_for_contract("cosmos1x"), "wasm.cosmos1x");
    }

    #[test]
    fn dispatches_bank_send() {
        let encoders = create_encoders();
        let mut ctx = MockContext::new(u64::MAX);
        let msgs = encoders
            .encode(&mut ctx, CONTRACT, "", &bank_send("100"))
            .expect("valid send");
        assert_eq!(msgs.len(), 1);
        let HostMessage::Send(MsgSend {
            from_address,
            amount,
            ..
        }) = &msgs[0]
        else {
            panic!("expected send, got {:?}", msgs[0]);
        };
        assert_eq!(from_address, CONTRACT);
        assert_eq!(amount.to_string(), "100stake");
    }

    #[test]
    fn merge_none_keeps_base() {
        let encoders = create_encoders().merge(None);
        let mut ctx = MockContext::new(u64::MAX);
        assert_eq!(
            encoders
                .encode(&mut ctx, CONTRACT, "", &bank_send("1"))
                .expect("valid")
                .len(),
            1
        );
    }

    #[test]
    fn merge_replaces_only_set_slots() {
        let overrides = PartialEncoders {
            bank: Some(constant_bank()),
            ..Default::default()
        };
        assert_eq!(overrides.overridden(), vec![MessageKind::Bank]);
        let encoders = create_encoders().merge(Some(overrides));
        let mut ctx = MockContext::new(u64::MAX);

        let msgs = encoders
            .encode(&mut ctx, CONTRACT, "", &bank_send("1"))
            .expect("override succeeds");
        assert!(msgs.is_empty());

        let msgs = encoders
            .encode(&mut ctx, CONTRACT, "", &sample_message(MessageKind::Staking))
            .expect("default staking");
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn reject_disables_a_kind() {
        let encoders = create_encoders().merge(Some(PartialEncoders::reject(MessageKind::Gov)));
        let mut ctx = MockContext::new(u64::MAX);
        let err = encoders
            .encode(&mut ctx, CONTRACT, "", &sample_message(MessageKind::Gov))
            .expect_err("gov disabled");
        assert!(matches!(
            err,
            EncodeError::UnknownKind(reason) if reason == "gov messages are disabled"
        ));
    }

    #[test]
    fn gov_goes_through_its_slot() {
        let overrides = PartialEncoders {
            gov: Some(Arc::new(|_: &str, _: &GovMsg| -> EncodeResult { Ok(vec![]) })),
            ..Default::default()
        };
        let encoders = create_encoders().merge(Some(overrides));
        let mut ctx = MockContext::new(u64::MAX);
        assert!(encoders
            .encode(&mut ctx, CONTRACT, "", &sample_message(MessageKind::Gov))
            .expect("override")
            .is_empty());
    }

    #[test]
    fn custom_is_rejected_by_default() {
        let encoders = create_encoders();
        let mut ctx = MockContext::new(u64::MAX);
        let err = encoders
            .encode(&mut ctx, CONTRACT, "", &sample_message(MessageKind::Custom))
            .expect_err("custom unsupported");
        assert!(matches!(
            err,
            EncodeError::UnknownKind(reason) if reason == "custom variant not supported"
        ));
    }

    #[test]
    fn encode_json_requires_one_variant() {
        let encoders = create_encoders();
        let mut ctx = MockContext::new(u64::MAX);
        for raw in [
            br#"{}"#.as_slice(),
            br#"{"bank":{"send":{"to_address":"a","amount":[]}},"gov":{"vote":{"proposal_id":1,"option":"yes"}}}"#,
            br#"{"stargate":{}}"#,
            br#"{"bank":{}}"#,
        ] {
            let err = encoders
                .encode_json(&mut ctx, CONTRACT, "", raw)
                .expect_err("should be rejected");
            assert!(matches!(err, EncodeError::UnknownKind(_)), "unexpected {err}");
        }
    }

    #[test]
    fn encode_json_dispatches() {
        let encoders = create_encoders();
        let mut ctx = MockContext::new(u64::MAX);
        let raw = br#"{"bank":{"send":{"to_address":"cosmos1recipient","amount":[{"denom":"stake","amount":"5"}]}}}"#;
        let msgs = encoders
            .encode_json(&mut ctx, CONTRACT, "", raw)
            .expect("valid json");
        assert_eq!(msgs[0].type_url(), MsgSend::TYPE_URL);
    }

    #[test]
    fn every_default_kind_but_custom_encodes_its_sample() {
        let encoders = create_encoders();
        for kind in MessageKind::ALL {
            let mut ctx = MockContext::new(u64::MAX);
            let result =
                encoders.encode(&mut ctx, CONTRACT, "wasm.cosmos1contract", &sample_message(kind));
            match kind {
                MessageKind::Custom => assert!(result.is_err()),
                _ => assert!(
                    !result.expect("sample encodes").is_empty(),
                    "{kind} produced nothing"
                ),
            }
        }
    }

    proptest! {
        #[test]
        fn merge_of_empty_override_is_identity(mask in 0u16..512) {
            let kinds: Vec<_> = MessageKind::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, kind)| kind)
                .collect();

            let mut merged = create_encoders().merge(Some(PartialEncoders::default()));
            for kind in &kinds {
                merged = merged.merge(Some(PartialEncoders::reject(*kind)));
            }
            let base = create_encoders();

            for kind in MessageKind::ALL {
                let msg = sample_message(kind);
                let mut ctx_a = MockContext::new(u64::MAX);
                let mut ctx_b = MockContext::new(u64::MAX);
                let got = merged.encode(&mut ctx_a, CONTRACT, "", &msg);
                let want = base.encode(&mut ctx_b, CONTRACT, "", &msg);
                if kinds.contains(&kind) {
                    prop_assert!(matches!(got, Err(EncodeError::UnknownKind(_))));
                } else {
                    match (got, want) {
                        (Ok(got), Ok(want)) => prop_assert_eq!(got, want),
                        (Err(got), Err(want)) => prop_assert_eq!(got.code(), want.code()),
                        (got, want) => prop_assert!(false, "diverged: {:?} vs {:?}", got, want),
                    }
                }
            }
        }
    }
}
