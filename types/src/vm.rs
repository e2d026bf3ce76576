//! Messages emitted by contracts running inside the VM.
//!
//! These are untrusted, unvalidated descriptions of an intended chain effect. They
//! travel as JSON in the externally tagged form contracts produce
//! (`{"bank":{"send":{...}}}`) and are only turned into [`crate::host::HostMessage`]
//! values by the encoders in `vmgate-execution`.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The kinds of [`CosmosMsg`], one per top-level JSON key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    Bank,
    Custom,
    Distribution,
    Ibc,
    Ibc2,
    Staking,
    Any,
    Wasm,
    Gov,
}

impl MessageKind {
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Bank,
        MessageKind::Custom,
        MessageKind::Distribution,
        MessageKind::Ibc,
        MessageKind::Ibc2,
        MessageKind::Staking,
        MessageKind::Any,
        MessageKind::Wasm,
        MessageKind::Gov,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Bank => "bank",
            MessageKind::Custom => "custom",
            MessageKind::Distribution => "distribution",
            MessageKind::Ibc => "ibc",
            MessageKind::Ibc2 => "ibc2",
            MessageKind::Staking => "staking",
            MessageKind::Any => "any",
            MessageKind::Wasm => "wasm",
            MessageKind::Gov => "gov",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Opaque bytes, base64 encoded in JSON.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.0)
    }
}

impl fmt::Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binary({})", self.to_base64())
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(s.as_bytes())
            .map(Binary)
            .map_err(|_| serde::de::Error::custom("invalid base64"))
    }
}

/// Raw JSON bytes passed through untouched (used by chain-specific messages).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawMessage(pub Vec<u8>);

impl Serialize for RawMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value: serde_json::Value =
            serde_json::from_slice(&self.0).map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        serde_json::to_vec(&value)
            .map(RawMessage)
            .map_err(serde::de::Error::custom)
    }
}

/// Nanoseconds since the unix epoch, encoded as a decimal string in JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub fn nanos(&self) -> u64 {
        self.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>()
            .map(Timestamp)
            .map_err(|_| serde::de::Error::custom("invalid timestamp"))
    }
}

/// A VM-side coin. The amount is an unvalidated decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmosMsg {
    Bank(BankMsg),
    Custom(RawMessage),
    Distribution(DistributionMsg),
    Ibc(IbcMsg),
    Ibc2(Ibc2Msg),
    Staking(StakingMsg),
    Any(AnyMsg),
    Wasm(WasmMsg),
    Gov(GovMsg),
}

impl CosmosMsg {
    pub fn kind(&self) -> MessageKind {
        match self {
            CosmosMsg::Bank(_) => MessageKind::Bank,
            CosmosMsg::Custom(_) => MessageKind::Custom,
            CosmosMsg::Distribution(_) => MessageKind::Distribution,
            CosmosMsg::Ibc(_) => MessageKind::Ibc,
            CosmosMsg::Ibc2(_) => MessageKind::Ibc2,
            CosmosMsg::Staking(_) => MessageKind::Staking,
            CosmosMsg::Any(_) => MessageKind::Any,
            CosmosMsg::Wasm(_) => MessageKind::Wasm,
            CosmosMsg::Gov(_) => MessageKind::Gov,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankMsg {
    Send {
        to_address: String,
        amount: Vec<Coin>,
    },
    /// Accepted on the wire but not translatable by the default encoder.
    Burn { amount: Vec<Coin> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMsg {
    SetWithdrawAddress {
        address: String,
    },
    WithdrawDelegatorReward {
        validator: String,
    },
    FundCommunityPool {
        #[serde(default)]
        amount: Vec<Coin>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingMsg {
    Delegate {
        validator: String,
        amount: Coin,
    },
    Undelegate {
        validator: String,
        amount: Coin,
    },
    Redelegate {
        src_validator: String,
        dst_validator: String,
        amount: Coin,
    },
}

/// A type-tagged payload naming an arbitrary host message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyMsg {
    pub type_url: String,
    pub value: Binary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasmMsg {
    Execute {
        contract_addr: String,
        msg: Binary,
        #[serde(default)]
        funds: Vec<Coin>,
    },
    Instantiate {
        admin: Option<String>,
        code_id: u64,
        msg: Binary,
        #[serde(default)]
        funds: Vec<Coin>,
        label: String,
    },
    Instantiate2 {
        admin: Option<String>,
        code_id: u64,
        label: String,
        msg: Binary,
        #[serde(default)]
        funds: Vec<Coin>,
        salt: Binary,
    },
    Migrate {
        contract_addr: String,
        new_code_id: u64,
        msg: Binary,
    },
    UpdateAdmin {
        contract_addr: String,
        admin: String,
    },
    ClearAdmin {
        contract_addr: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcTimeoutBlock {
    pub revision: u64,
    pub height: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcTimeout {
    #[serde(default)]
    pub block: Option<IbcTimeoutBlock>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcFee {
    #[serde(default)]
    pub receive_fee: Vec<Coin>,
    #[serde(default)]
    pub ack_fee: Vec<Coin>,
    #[serde(default)]
    pub timeout_fee: Vec<Coin>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IbcMsg {
    Transfer {
        channel_id: String,
        to_address: String,
        amount: Coin,
        timeout: IbcTimeout,
        #[serde(default)]
        memo: String,
    },
    CloseChannel {
        channel_id: String,
    },
    PayPacketFee {
        port_id: String,
        channel_id: String,
        fee: IbcFee,
        #[serde(default)]
        relayers: Vec<String>,
    },
    PayPacketFeeAsync {
        port_id: String,
        channel_id: String,
        sequence: u64,
        fee: IbcFee,
        #[serde(default)]
        relayers: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ibc2Payload {
    pub source_port: String,
    pub destination_port: String,
    pub version: String,
    pub encoding: String,
    pub value: Binary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ibc2Msg {
    SendPacket {
        source_client: String,
        payloads: Vec<Ibc2Payload>,
        timeout: Timestamp,
    },
}

/// A vote option as written by the contract. Unknown strings are kept so the
/// governance encoder can reject them with a precise error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VoteOption {
    Yes,
    No,
    NoWithVeto,
    Abstain,
    Other(String),
}

impl VoteOption {
    pub fn as_str(&self) -> &str {
        match self {
            VoteOption::Yes => "yes",
            VoteOption::No => "no",
            VoteOption::NoWithVeto => "no_with_veto",
            VoteOption::Abstain => "abstain",
            VoteOption::Other(other) => other,
        }
    }
}

impl From<&str> for VoteOption {
    fn from(s: &str) -> Self {
        match s {
            "yes" => VoteOption::Yes,
            "no" => VoteOption::No,
            "no_with_veto" => VoteOption::NoWithVeto,
            "abstain" => VoteOption::Abstain,
            other => VoteOption::Other(other.to_string()),
        }
    }
}

impl Serialize for VoteOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VoteOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(VoteOption::from(s.as_str()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    pub weight: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovMsg {
    Vote {
        proposal_id: u64,
        option: VoteOption,
    },
    VoteWeighted {
        proposal_id: u64,
        options: Vec<WeightedVoteOption>,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("message has no populated variant")]
    NoVariant,
    #[error("message has {0} populated variants, expected exactly one")]
    MultipleVariants(usize),
    #[error("unknown message variant: {0}")]
    UnknownVariant(String),
    #[error("message must be a JSON object")]
    NotAnObject,
    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes a contract-emitted message, requiring exactly one populated variant.
pub fn decode_cosmos_msg(raw: &[u8]) -> Result<CosmosMsg, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let populated: Vec<_> = object.iter().filter(|(_, v)| !v.is_null()).collect();
    let (key, _) = match populated.as_slice() {
        [] => return Err(DecodeError::NoVariant),
        [single] => *single,
        many => return Err(DecodeError::MultipleVariants(many.len())),
    };
    let kind: MessageKind = key.parse().map_err(DecodeError::UnknownVariant)?;

    let mut single = serde_json::Map::new();
    single.insert(key.clone(), object[key].clone());
    serde_json::from_value(serde_json::Value::Object(single))
        .map_err(|source| DecodeError::Malformed { kind, source })
}
