//! Resolution of type-tagged (`Any`) payloads into host messages.

use commonware_codec::{DecodeExt, Error as CodecError};
use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error;
use vmgate_types::host::{
    Any, HostMessage, MsgBeginRedelegate, MsgChannelCloseInit, MsgClearAdmin, MsgCustom,
    MsgDelegate, MsgExec, MsgExecuteContract, MsgFundCommunityPool, MsgInstantiateContract,
    MsgInstantiateContract2, MsgMigrateContract, MsgSend, MsgSendPacket, MsgSetWithdrawAddress,
    MsgTransfer, MsgUndelegate, MsgUpdateAdmin, MsgVote, MsgVoteWeighted,
    MsgWithdrawDelegatorReward,
};

/// Maximum nesting of `Exec` messages resolved by [`TypeRegistry::unpack_interfaces`].
pub const MAX_UNPACK_DEPTH: usize = 8;

/// Type URLs of every built-in host message.
pub const BUILTIN_TYPE_URLS: [&str; 19] = [
    MsgSend::TYPE_URL,
    MsgSetWithdrawAddress::TYPE_URL,
    MsgWithdrawDelegatorReward::TYPE_URL,
    MsgFundCommunityPool::TYPE_URL,
    MsgDelegate::TYPE_URL,
    MsgBeginRedelegate::TYPE_URL,
    MsgUndelegate::TYPE_URL,
    MsgExecuteContract::TYPE_URL,
    MsgInstantiateContract::TYPE_URL,
    MsgInstantiateContract2::TYPE_URL,
    MsgMigrateContract::TYPE_URL,
    MsgUpdateAdmin::TYPE_URL,
    MsgClearAdmin::TYPE_URL,
    MsgChannelCloseInit::TYPE_URL,
    MsgTransfer::TYPE_URL,
    MsgSendPacket::TYPE_URL,
    MsgVote::TYPE_URL,
    MsgVoteWeighted::TYPE_URL,
    MsgExec::TYPE_URL,
];

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("no concrete type registered for type URL {0}")]
    Unregistered(String),
    #[error("failed to decode {type_url}: {source}")]
    Decode {
        type_url: String,
        #[source]
        source: CodecError,
    },
    #[error("payload for {expected} decodes to {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("nested messages exceed depth {0}")]
    MaxDepth(usize),
}

/// Codec used by the generic message encoder.
pub trait AnyUnpacker: Send + Sync {
    /// Decodes the payload of `any` into a concrete host message.
    fn unpack_any(&self, any: &Any) -> Result<HostMessage, UnpackError>;

    /// Resolves every nested `Any` inside `msg`, caching the decoded values.
    fn unpack_interfaces(&self, msg: &mut HostMessage) -> Result<(), UnpackError>;
}

fn is_builtin(type_url: &str) -> bool {
    BUILTIN_TYPE_URLS.iter().any(|url| *url == type_url)
}

type Decoder = Arc<dyn Fn(&[u8]) -> Result<HostMessage, CodecError> + Send + Sync>;

fn decode_canonical(bytes: &[u8]) -> Result<HostMessage, CodecError> {
    HostMessage::decode(bytes)
}

/// Maps type URLs to decoders.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: BTreeMap<String, Decoder>,
}

impl TypeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry that accepts every built-in host message.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for type_url in BUILTIN_TYPE_URLS {
            registry.register(type_url, decode_canonical);
        }
        registry
    }

    /// Registers (or replaces) the decoder for `type_url`.
    pub fn register<F>(&mut self, type_url: impl Into<String>, decoder: F)
    where
        F: Fn(&[u8]) -> Result<HostMessage, CodecError> + Send + Sync + 'static,
    {
        self.decoders.insert(type_url.into(), Arc::new(decoder));
    }

    /// Registers the canonical decoder for a built-in type URL. Returns false if
    /// `type_url` is not built in.
    pub fn register_builtin(&mut self, type_url: &str) -> bool {
        if !is_builtin(type_url) {
            return false;
        }
        self.register(type_url, decode_canonical);
        true
    }

    pub fn is_registered(&self, type_url: &str) -> bool {
        self.decoders.contains_key(type_url)
    }

    pub fn type_urls(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    fn resolve(&self, msg: &mut HostMessage, depth: usize) -> Result<(), UnpackError> {
        let HostMessage::Exec(exec) = msg else {
            return Ok(());
        };
        if depth >= MAX_UNPACK_DEPTH {
            return Err(UnpackError::MaxDepth(MAX_UNPACK_DEPTH));
        }
        for any in exec.msgs.iter_mut() {
            let mut inner = self.unpack_any(any)?;
            self.resolve(&mut inner, depth + 1)?;
            any.set_cached_value(inner);
        }
        Ok(())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.decoders.keys()).finish()
    }
}

impl AnyUnpacker for TypeRegistry {
    fn unpack_any(&self, any: &Any) -> Result<HostMessage, UnpackError> {
        let decoder = self
            .decoders
            .get(&any.type_url)
            .ok_or_else(|| UnpackError::Unregistered(any.type_url.clone()))?;
        let msg = decoder(&any.value).map_err(|source| UnpackError::Decode {
            type_url: any.type_url.clone(),
            source,
        })?;
        // Custom payloads may not claim a built-in URL.
        let matches = match msg.static_type_url() {
            Some(url) => url == any.type_url,
            None => !is_builtin(&any.type_url) && msg.type_url() == any.type_url,
        };
        if !matches {
            return Err(UnpackError::TypeMismatch {
                expected: any.type_url.clone(),
                found: msg
                    .static_type_url()
                    .unwrap_or(MsgCustom::TYPE_URL)
                    .to_string(),
            });
        }
        Ok(msg)
    }

    fn unpack_interfaces(&self, msg: &mut HostMessage) -> Result<(), UnpackError> {
        self.resolve(msg, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;

    fn clear_admin() -> HostMessage {
        HostMessage::ClearAdmin(MsgClearAdmin {
            sender: "cosmos1sender".to_string(),
            contract: "cosmos1contract".to_string(),
        })
    }

    fn exec(msgs: Vec<Any>) -> HostMessage {
        HostMessage::Exec(MsgExec {
            grantee: "cosmos1grantee".to_string(),
            msgs,
        })
    }

    #[test]
    fn unpacks_registered_types() {
        let registry = TypeRegistry::with_defaults();
        let msg = clear_admin();
        assert_eq!(registry.unpack_any(&Any::pack(&msg)).expect("unpack"), msg);
    }

    #[test]
    fn rejects_unregistered_type() {
        let registry = TypeRegistry::empty();
        let err = registry
            .unpack_any(&Any::pack(&clear_admin()))
            .expect_err("nothing registered");
        assert!(matches!(err, UnpackError::Unregistered(url) if url == MsgClearAdmin::TYPE_URL));
    }

    #[test]
    fn rejects_tag_that_disagrees_with_type_url() {
        let registry = TypeRegistry::with_defaults();
        let any = Any::new(MsgSend::TYPE_URL, clear_admin().encode().to_vec());
        assert!(matches!(
            registry.unpack_any(&any),
            Err(UnpackError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn custom_payload_cannot_claim_builtin_url() {
        let mut registry = TypeRegistry::empty();
        assert!(registry.register_builtin(MsgSend::TYPE_URL));
        let forged = HostMessage::Custom(MsgCustom {
            type_url: MsgSend::TYPE_URL.to_string(),
            value: b"not a bank send".to_vec(),
        });
        let any = Any::new(MsgSend::TYPE_URL, forged.encode().to_vec());
        let err = registry.unpack_any(&any).expect_err("forged send");
        assert!(matches!(
            err,
            UnpackError::TypeMismatch { expected, found }
                if expected == MsgSend::TYPE_URL && found == MsgCustom::TYPE_URL
        ));
    }

    #[test]
    fn custom_decoder_for_custom_url() {
        const URL: &str = "/example.v1.MsgPing";
        let mut registry = TypeRegistry::empty();
        registry.register(URL, |bytes: &[u8]| {
            Ok(HostMessage::Custom(MsgCustom {
                type_url: URL.to_string(),
                value: bytes.to_vec(),
            }))
        });
        let msg = registry
            .unpack_any(&Any::new(URL, vec![1, 2]))
            .expect("custom type");
        assert_eq!(msg.type_url(), URL);
    }

    #[test]
    fn rejects_garbage_payload() {
        let registry = TypeRegistry::with_defaults();
        let any = Any::new(MsgSend::TYPE_URL, vec![0, 0xff]);
        assert!(matches!(
            registry.unpack_any(&any),
            Err(UnpackError::Decode { .. })
        ));
    }

    #[test]
    fn register_builtin_only_accepts_known_urls() {
        let mut registry = TypeRegistry::empty();
        assert!(registry.register_builtin(MsgSend::TYPE_URL));
        assert!(!registry.register_builtin("/example.v1.MsgUnknown"));
        assert_eq!(registry.type_urls().collect::<Vec<_>>(), vec![MsgSend::TYPE_URL]);
    }

    #[test]
    fn resolves_nested_exec_messages() {
        let registry = TypeRegistry::with_defaults();
        let inner = exec(vec![Any::pack(&clear_admin())]);
        let mut outer = exec(vec![Any::pack(&inner)]);
        registry.unpack_interfaces(&mut outer).expect("resolve");

        let HostMessage::Exec(outer) = outer else {
            panic!("expected exec");
        };
        let Some(HostMessage::Exec(resolved)) = outer.msgs[0].cached_value() else {
            panic!("expected cached exec");
        };
        assert_eq!(resolved.msgs[0].cached_value(), Some(&clear_admin()));
    }

    #[test]
    fn nested_failure_is_reported() {
        let registry = TypeRegistry::with_defaults();
        let mut msg = exec(vec![Any::new("/example.v1.MsgUnknown", vec![])]);
        assert!(matches!(
            registry.unpack_interfaces(&mut msg),
            Err(UnpackError::Unregistered(_))
        ));
    }

    #[test]
    fn depth_is_bounded() {
        let registry = TypeRegistry::with_defaults();
        let mut msg = clear_admin();
        for _ in 0..=MAX_UNPACK_DEPTH {
            msg = exec(vec![Any::pack(&msg)]);
        }
        assert!(matches!(
            registry.unpack_interfaces(&mut msg),
            Err(UnpackError::MaxDepth(MAX_UNPACK_DEPTH))
        ));

        let mut shallow = clear_admin();
        for _ in 0..MAX_UNPACK_DEPTH {
            shallow = exec(vec![Any::pack(&shallow)]);
        }
        registry.unpack_interfaces(&mut shallow).expect("within depth");
    }
}
