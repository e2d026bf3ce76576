//! Chain-native messages produced by the encoders.
//!
//! Every message has a stable type URL and a canonical binary encoding: a one-byte
//! tag followed by the message fields in declaration order. Strings and byte fields
//! are `u32`-length-prefixed, integers are big endian. The same encoding backs
//! `Any` payloads and the digest validators compare.

use crate::{
    codec::{
        bytes_encode_size, list_encode_size, optional_string_encode_size, read_bytes, read_list,
        read_optional_string, read_string, string_encode_size, write_bytes, write_list,
        write_optional_string, write_string, MAX_BYTES_LENGTH, MAX_LIST_LENGTH, MAX_STRING_LENGTH,
    },
    coin::{Coin, Coins},
    decimal::Decimal,
};
use base64::{engine::general_purpose, Engine as _};
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Per-field codec used by the message definitions below.
trait Field: Sized {
    fn write_field(&self, writer: &mut impl BufMut);
    fn read_field(reader: &mut impl Buf) -> Result<Self, Error>;
    fn field_size(&self) -> usize;
}

impl Field for String {
    fn write_field(&self, writer: &mut impl BufMut) {
        write_string(self, writer);
    }

    fn read_field(reader: &mut impl Buf) -> Result<Self, Error> {
        read_string(reader, MAX_STRING_LENGTH)
    }

    fn field_size(&self) -> usize {
        string_encode_size(self)
    }
}

impl Field for Option<String> {
    fn write_field(&self, writer: &mut impl BufMut) {
        write_optional_string(self.as_deref(), writer);
    }

    fn read_field(reader: &mut impl Buf) -> Result<Self, Error> {
        read_optional_string(reader, MAX_STRING_LENGTH)
    }

    fn field_size(&self) -> usize {
        optional_string_encode_size(self.as_deref())
    }
}

impl Field for Vec<u8> {
    fn write_field(&self, writer: &mut impl BufMut) {
        write_bytes(self, writer);
    }

    fn read_field(reader: &mut impl Buf) -> Result<Self, Error> {
        read_bytes(reader, MAX_BYTES_LENGTH)
    }

    fn field_size(&self) -> usize {
        bytes_encode_size(self)
    }
}

macro_rules! codec_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn write_field(&self, writer: &mut impl BufMut) {
                    self.write(writer);
                }

                fn read_field(reader: &mut impl Buf) -> Result<Self, Error> {
                    <$ty>::read(reader)
                }

                fn field_size(&self) -> usize {
                    self.encode_size()
                }
            }
        )*
    };
}

macro_rules! list_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for Vec<$ty> {
                fn write_field(&self, writer: &mut impl BufMut) {
                    write_list(self, writer);
                }

                fn read_field(reader: &mut impl Buf) -> Result<Self, Error> {
                    read_list(reader, MAX_LIST_LENGTH)
                }

                fn field_size(&self) -> usize {
                    list_encode_size(self)
                }
            }
        )*
    };
}

codec_field!(u64, bool, Coin, Coins, Height, VoteOption);
list_field!(Payload, WeightedVoteOption, Any);

macro_rules! host_message {
    (
        $(#[$meta:meta])*
        $name:ident = $url:literal {
            $($(#[$field_meta:meta])* $field:ident: $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $ty,)*
        }

        impl $name {
            pub const TYPE_URL: &'static str = $url;
        }

        impl Write for $name {
            fn write(&self, writer: &mut impl BufMut) {
                $(Field::write_field(&self.$field, writer);)*
            }
        }

        impl Read for $name {
            type Cfg = ();

            fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
                Ok(Self {
                    $($field: Field::read_field(reader)?,)*
                })
            }
        }

        impl EncodeSize for $name {
            fn encode_size(&self) -> usize {
                0 $(+ Field::field_size(&self.$field))*
            }
        }
    };
}

mod serde_base64 {
    use base64::{engine::general_purpose, Engine as _};
    use serde::Serializer;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }
}

/// An inter-chain block height. `0/0` disables height-based timeouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

impl Write for Height {
    fn write(&self, writer: &mut impl BufMut) {
        self.revision_number.write(writer);
        self.revision_height.write(writer);
    }
}

impl Read for Height {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            revision_number: u64::read(reader)?,
            revision_height: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Height {
    fn encode_size(&self) -> usize {
        self.revision_number.encode_size() + self.revision_height.encode_size()
    }
}

/// Governance vote options, numbered as the host chain numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VoteOption {
    Unspecified = 0,
    Yes = 1,
    Abstain = 2,
    No = 3,
    NoWithVeto = 4,
}

impl Write for VoteOption {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for VoteOption {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Yes),
            2 => Ok(Self::Abstain),
            3 => Ok(Self::No),
            4 => Ok(Self::NoWithVeto),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for VoteOption {
    fn encode_size(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    pub weight: Decimal,
}

impl Write for WeightedVoteOption {
    fn write(&self, writer: &mut impl BufMut) {
        self.option.write(writer);
        write_string(&self.weight.to_string(), writer);
    }
}

impl Read for WeightedVoteOption {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let option = VoteOption::read(reader)?;
        let weight = read_string(reader, MAX_STRING_LENGTH)?
            .parse()
            .map_err(|_| Error::Invalid("WeightedVoteOption", "invalid weight"))?;
        Ok(Self { option, weight })
    }
}

impl EncodeSize for WeightedVoteOption {
    fn encode_size(&self) -> usize {
        self.option.encode_size() + string_encode_size(&self.weight.to_string())
    }
}

host_message!(
    /// A single application payload carried by a v2 packet.
    Payload = "/ibc.core.channel.v2.Payload" {
        source_port: String,
        destination_port: String,
        version: String,
        encoding: String,
        #[serde(with = "serde_base64")]
        value: Vec<u8>,
    }
);

/// A type-tagged, still-encoded host message.
///
/// `cached` holds the decoded message once a codec has resolved it. It never takes
/// part in the encoding or in equality.
#[derive(Clone, Debug)]
pub struct Any {
    pub type_url: String,
    pub value: Vec<u8>,
    cached: Option<Box<HostMessage>>,
}

impl Any {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            cached: None,
        }
    }

    /// Packs `msg` under its own type URL.
    pub fn pack(msg: &HostMessage) -> Self {
        Self::new(msg.type_url(), msg.encode().to_vec())
    }

    pub fn cached_value(&self) -> Option<&HostMessage> {
        self.cached.as_deref()
    }

    pub fn cached_value_mut(&mut self) -> Option<&mut HostMessage> {
        self.cached.as_deref_mut()
    }

    pub fn set_cached_value(&mut self, msg: HostMessage) {
        self.cached = Some(Box::new(msg));
    }
}

impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        self.type_url == other.type_url && self.value == other.value
    }
}

impl Eq for Any {}

impl Serialize for Any {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.cached.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Any", fields)?;
        state.serialize_field("type_url", &self.type_url)?;
        state.serialize_field("value", &general_purpose::STANDARD.encode(&self.value))?;
        if let Some(cached) = &self.cached {
            state.serialize_field("cached", cached)?;
        }
        state.end()
    }
}

impl Write for Any {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.type_url, writer);
        write_bytes(&self.value, writer);
    }
}

impl Read for Any {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let type_url = read_string(reader, MAX_STRING_LENGTH)?;
        let value = read_bytes(reader, MAX_BYTES_LENGTH)?;
        Ok(Self::new(type_url, value))
    }
}

impl EncodeSize for Any {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.type_url) + bytes_encode_size(&self.value)
    }
}

host_message!(
    MsgSend = "/cosmos.bank.v1beta1.MsgSend" {
        from_address: String,
        to_address: String,
        amount: Coins,
    }
);

host_message!(
    MsgSetWithdrawAddress = "/cosmos.distribution.v1beta1.MsgSetWithdrawAddress" {
        delegator_address: String,
        withdraw_address: String,
    }
);

host_message!(
    MsgWithdrawDelegatorReward = "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward" {
        delegator_address: String,
        validator_address: String,
    }
);

host_message!(
    MsgFundCommunityPool = "/cosmos.distribution.v1beta1.MsgFundCommunityPool" {
        depositor: String,
        amount: Coins,
    }
);

host_message!(
    MsgDelegate = "/cosmos.staking.v1beta1.MsgDelegate" {
        delegator_address: String,
        validator_address: String,
        amount: Coin,
    }
);

host_message!(
    MsgBeginRedelegate = "/cosmos.staking.v1beta1.MsgBeginRedelegate" {
        delegator_address: String,
        validator_src_address: String,
        validator_dst_address: String,
        amount: Coin,
    }
);

host_message!(
    MsgUndelegate = "/cosmos.staking.v1beta1.MsgUndelegate" {
        delegator_address: String,
        validator_address: String,
        amount: Coin,
    }
);

host_message!(
    MsgExecuteContract = "/cosmwasm.wasm.v1.MsgExecuteContract" {
        sender: String,
        contract: String,
        #[serde(with = "serde_base64")]
        msg: Vec<u8>,
        funds: Coins,
    }
);

host_message!(
    MsgInstantiateContract = "/cosmwasm.wasm.v1.MsgInstantiateContract" {
        sender: String,
        admin: Option<String>,
        code_id: u64,
        label: String,
        #[serde(with = "serde_base64")]
        msg: Vec<u8>,
        funds: Coins,
    }
);

host_message!(
    MsgInstantiateContract2 = "/cosmwasm.wasm.v1.MsgInstantiateContract2" {
        sender: String,
        admin: Option<String>,
        code_id: u64,
        label: String,
        #[serde(with = "serde_base64")]
        msg: Vec<u8>,
        funds: Coins,
        #[serde(with = "serde_base64")]
        salt: Vec<u8>,
        fix_msg: bool,
    }
);

host_message!(
    MsgMigrateContract = "/cosmwasm.wasm.v1.MsgMigrateContract" {
        sender: String,
        contract: String,
        code_id: u64,
        #[serde(with = "serde_base64")]
        msg: Vec<u8>,
    }
);

host_message!(
    MsgUpdateAdmin = "/cosmwasm.wasm.v1.MsgUpdateAdmin" {
        sender: String,
        new_admin: String,
        contract: String,
    }
);

host_message!(
    MsgClearAdmin = "/cosmwasm.wasm.v1.MsgClearAdmin" {
        sender: String,
        contract: String,
    }
);

host_message!(
    MsgChannelCloseInit = "/ibc.core.channel.v1.MsgChannelCloseInit" {
        port_id: String,
        channel_id: String,
        signer: String,
    }
);

host_message!(
    MsgTransfer = "/ibc.applications.transfer.v1.MsgTransfer" {
        source_port: String,
        source_channel: String,
        token: Coin,
        sender: String,
        receiver: String,
        timeout_height: Height,
        timeout_timestamp: u64,
        memo: String,
    }
);

host_message!(
    /// `timeout_timestamp` is in whole unix seconds.
    MsgSendPacket = "/ibc.core.channel.v2.MsgSendPacket" {
        source_client: String,
        timeout_timestamp: u64,
        payloads: Vec<Payload>,
        signer: String,
    }
);

host_message!(
    MsgVote = "/cosmos.gov.v1.MsgVote" {
        proposal_id: u64,
        voter: String,
        option: VoteOption,
        metadata: String,
    }
);

host_message!(
    MsgVoteWeighted = "/cosmos.gov.v1.MsgVoteWeighted" {
        proposal_id: u64,
        voter: String,
        options: Vec<WeightedVoteOption>,
        metadata: String,
    }
);

host_message!(
    /// Executes nested messages on behalf of their granters.
    MsgExec = "/cosmos.authz.v1beta1.MsgExec" {
        grantee: String,
        msgs: Vec<Any>,
    }
);

host_message!(
    /// A chain-specific message with its own type URL.
    MsgCustom = "/vmgate.custom.v1.MsgCustom" {
        type_url: String,
        #[serde(with = "serde_base64")]
        value: Vec<u8>,
    }
);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMessage {
    Send(MsgSend),
    SetWithdrawAddress(MsgSetWithdrawAddress),
    WithdrawDelegatorReward(MsgWithdrawDelegatorReward),
    FundCommunityPool(MsgFundCommunityPool),
    Delegate(MsgDelegate),
    BeginRedelegate(MsgBeginRedelegate),
    Undelegate(MsgUndelegate),
    ExecuteContract(MsgExecuteContract),
    InstantiateContract(MsgInstantiateContract),
    InstantiateContract2(MsgInstantiateContract2),
    MigrateContract(MsgMigrateContract),
    UpdateAdmin(MsgUpdateAdmin),
    ClearAdmin(MsgClearAdmin),
    ChannelCloseInit(MsgChannelCloseInit),
    Transfer(MsgTransfer),
    SendPacket(MsgSendPacket),
    Vote(MsgVote),
    VoteWeighted(MsgVoteWeighted),
    Exec(MsgExec),
    Custom(MsgCustom),
}

impl HostMessage {
    /// The type URL fixed by the variant, or `None` for custom messages.
    pub fn static_type_url(&self) -> Option<&'static str> {
        let url = match self {
            Self::Send(_) => MsgSend::TYPE_URL,
            Self::SetWithdrawAddress(_) => MsgSetWithdrawAddress::TYPE_URL,
            Self::WithdrawDelegatorReward(_) => MsgWithdrawDelegatorReward::TYPE_URL,
            Self::FundCommunityPool(_) => MsgFundCommunityPool::TYPE_URL,
            Self::Delegate(_) => MsgDelegate::TYPE_URL,
            Self::BeginRedelegate(_) => MsgBeginRedelegate::TYPE_URL,
            Self::Undelegate(_) => MsgUndelegate::TYPE_URL,
            Self::ExecuteContract(_) => MsgExecuteContract::TYPE_URL,
            Self::InstantiateContract(_) => MsgInstantiateContract::TYPE_URL,
            Self::InstantiateContract2(_) => MsgInstantiateContract2::TYPE_URL,
            Self::MigrateContract(_) => MsgMigrateContract::TYPE_URL,
            Self::UpdateAdmin(_) => MsgUpdateAdmin::TYPE_URL,
            Self::ClearAdmin(_) => MsgClearAdmin::TYPE_URL,
            Self::ChannelCloseInit(_) => MsgChannelCloseInit::TYPE_URL,
            Self::Transfer(_) => MsgTransfer::TYPE_URL,
            Self::SendPacket(_) => MsgSendPacket::TYPE_URL,
            Self::Vote(_) => MsgVote::TYPE_URL,
            Self::VoteWeighted(_) => MsgVoteWeighted::TYPE_URL,
            Self::Exec(_) => MsgExec::TYPE_URL,
            Self::Custom(_) => return None,
        };
        Some(url)
    }

    /// The type URL this message is packed under. Custom messages report their own.
    pub fn type_url(&self) -> &str {
        match self {
            Self::Custom(msg) => &msg.type_url,
            other => other.static_type_url().unwrap_or_default(),
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Send(_) => 0,
            Self::SetWithdrawAddress(_) => 1,
            Self::WithdrawDelegatorReward(_) => 2,
            Self::FundCommunityPool(_) => 3,
            Self::Delegate(_) => 4,
            Self::BeginRedelegate(_) => 5,
            Self::Undelegate(_) => 6,
            Self::ExecuteContract(_) => 7,
            Self::InstantiateContract(_) => 8,
            Self::InstantiateContract2(_) => 9,
            Self::MigrateContract(_) => 10,
            Self::UpdateAdmin(_) => 11,
            Self::ClearAdmin(_) => 12,
            Self::ChannelCloseInit(_) => 13,
            Self::Transfer(_) => 14,
            Self::SendPacket(_) => 15,
            Self::Vote(_) => 16,
            Self::VoteWeighted(_) => 17,
            Self::Exec(_) => 18,
            Self::Custom(_) => 19,
        }
    }
}

impl Write for HostMessage {
    fn write(&self, writer: &mut impl BufMut) {
        self.tag().write(writer);
        match self {
            Self::Send(msg) => msg.write(writer),
            Self::SetWithdrawAddress(msg) => msg.write(writer),
            Self::WithdrawDelegatorReward(msg) => msg.write(writer),
            Self::FundCommunityPool(msg) => msg.write(writer),
            Self::Delegate(msg) => msg.write(writer),
            Self::BeginRedelegate(msg) => msg.write(writer),
            Self::Undelegate(msg) => msg.write(writer),
            Self::ExecuteContract(msg) => msg.write(writer),
            Self::InstantiateContract(msg) => msg.write(writer),
            Self::InstantiateContract2(msg) => msg.write(writer),
            Self::MigrateContract(msg) => msg.write(writer),
            Self::UpdateAdmin(msg) => msg.write(writer),
            Self::ClearAdmin(msg) => msg.write(writer),
            Self::ChannelCloseInit(msg) => msg.write(writer),
            Self::Transfer(msg) => msg.write(writer),
            Self::SendPacket(msg) => msg.write(writer),
            Self::Vote(msg) => msg.write(writer),
            Self::VoteWeighted(msg) => msg.write(writer),
            Self::Exec(msg) => msg.write(writer),
            Self::Custom(msg) => msg.write(writer),
        }
    }
}

impl Read for HostMessage {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let msg = match u8::read(reader)? {
            0 => Self::Send(MsgSend::read(reader)?),
            1 => Self::SetWithdrawAddress(MsgSetWithdrawAddress::read(reader)?),
            2 => Self::WithdrawDelegatorReward(MsgWithdrawDelegatorReward::read(reader)?),
            3 => Self::FundCommunityPool(MsgFundCommunityPool::read(reader)?),
            4 => Self::Delegate(MsgDelegate::read(reader)?),
            5 => Self::BeginRedelegate(MsgBeginRedelegate::read(reader)?),
            6 => Self::Undelegate(MsgUndelegate::read(reader)?),
            7 => Self::ExecuteContract(MsgExecuteContract::read(reader)?),
            8 => Self::InstantiateContract(MsgInstantiateContract::read(reader)?),
            9 => Self::InstantiateContract2(MsgInstantiateContract2::read(reader)?),
            10 => Self::MigrateContract(MsgMigrateContract::read(reader)?),
            11 => Self::UpdateAdmin(MsgUpdateAdmin::read(reader)?),
            12 => Self::ClearAdmin(MsgClearAdmin::read(reader)?),
            13 => Self::ChannelCloseInit(MsgChannelCloseInit::read(reader)?),
            14 => Self::Transfer(MsgTransfer::read(reader)?),
            15 => Self::SendPacket(MsgSendPacket::read(reader)?),
            16 => Self::Vote(MsgVote::read(reader)?),
            17 => Self::VoteWeighted(MsgVoteWeighted::read(reader)?),
            18 => Self::Exec(MsgExec::read(reader)?),
            19 => Self::Custom(MsgCustom::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(msg)
    }
}

impl EncodeSize for HostMessage {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Send(msg) => msg.encode_size(),
            Self::SetWithdrawAddress(msg) => msg.encode_size(),
            Self::WithdrawDelegatorReward(msg) => msg.encode_size(),
            Self::FundCommunityPool(msg) => msg.encode_size(),
            Self::Delegate(msg) => msg.encode_size(),
            Self::BeginRedelegate(msg) => msg.encode_size(),
            Self::Undelegate(msg) => msg.encode_size(),
            Self::ExecuteContract(msg) => msg.encode_size(),
            Self::InstantiateContract(msg) => msg.encode_size(),
            Self::InstantiateContract2(msg) => msg.encode_size(),
            Self::MigrateContract(msg) => msg.encode_size(),
            Self::UpdateAdmin(msg) => msg.encode_size(),
            Self::ClearAdmin(msg) => msg.encode_size(),
            Self::ChannelCloseInit(msg) => msg.encode_size(),
            Self::Transfer(msg) => msg.encode_size(),
            Self::SendPacket(msg) => msg.encode_size(),
            Self::Vote(msg) => msg.encode_size(),
            Self::VoteWeighted(msg) => msg.encode_size(),
            Self::Exec(msg) => msg.encode_size(),
            Self::Custom(msg) => msg.encode_size(),
        }
    }
}

/// Digest over an ordered list of host messages (count, then each canonical encoding).
pub fn messages_digest(msgs: &[HostMessage]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update((msgs.len() as u32).to_be_bytes().as_ref());
    for msg in msgs {
        hasher.update(msg.encode().as_ref());
    }
    hasher.finalize()
}
