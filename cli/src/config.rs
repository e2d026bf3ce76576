//! YAML configuration for the `vmgate` binary.

use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::Level;
use vmgate_execution::{
    encoders::any, FixedPortSource, MessageEncoders, PartialEncoders, TypeRegistry,
    BUILTIN_TYPE_URLS, DEFAULT_GAS_MULTIPLIER,
};
use vmgate_types::vm::MessageKind;

fn default_transfer_port() -> String {
    "transfer".to_string()
}

fn default_gas_limit() -> u64 {
    u64::MAX
}

fn default_gas_multiplier() -> u64 {
    DEFAULT_GAS_MULTIPLIER
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Source port of token transfers.
    #[serde(default = "default_transfer_port")]
    pub transfer_port: String,
    /// Host gas available to one dispatch.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// VM gas units per host gas unit.
    #[serde(default = "default_gas_multiplier")]
    pub gas_multiplier: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Message kinds rejected outright.
    #[serde(default)]
    pub disabled_kinds: Vec<String>,
    /// Type URLs accepted in generic messages. All built-in types when unset.
    #[serde(default)]
    pub allowed_any_types: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transfer_port: default_transfer_port(),
            gas_limit: default_gas_limit(),
            gas_multiplier: default_gas_multiplier(),
            log_level: default_log_level(),
            disabled_kinds: Vec::new(),
            allowed_any_types: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("unknown message kind: {value}")]
    UnknownKind { value: String },
    #[error("type URL is not a built-in host message: {value}")]
    UnknownAnyType { value: String },
}

#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub transfer_port: String,
    pub gas_limit: u64,
    pub gas_multiplier: u64,
    pub log_level: Level,
    pub disabled_kinds: Vec<MessageKind>,
    pub allowed_any_types: Option<Vec<String>>,
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.transfer_port.is_empty() {
            return Err(ConfigError::EmptyField {
                field: "transfer_port",
            });
        }
        ensure_nonzero("gas_limit", self.gas_limit)?;
        ensure_nonzero("gas_multiplier", self.gas_multiplier)?;
        let log_level = Level::from_str(&self.log_level).map_err(|_| {
            ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            }
        })?;
        let disabled_kinds = self
            .disabled_kinds
            .iter()
            .map(|value| {
                MessageKind::from_str(value).map_err(|value| ConfigError::UnknownKind { value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(allowed) = &self.allowed_any_types {
            if let Some(unknown) = allowed
                .iter()
                .find(|url| !BUILTIN_TYPE_URLS.iter().any(|builtin| *builtin == url.as_str()))
            {
                return Err(ConfigError::UnknownAnyType {
                    value: unknown.clone(),
                });
            }
        }

        Ok(ValidatedConfig {
            transfer_port: self.transfer_port,
            gas_limit: self.gas_limit,
            gas_multiplier: self.gas_multiplier,
            log_level,
            disabled_kinds,
            allowed_any_types: self.allowed_any_types,
        })
    }
}

impl ValidatedConfig {
    /// Type registry for generic messages, restricted to `allowed_any_types` if set.
    pub fn type_registry(&self) -> TypeRegistry {
        match &self.allowed_any_types {
            None => TypeRegistry::with_defaults(),
            Some(allowed) => {
                let mut registry = TypeRegistry::empty();
                for type_url in allowed {
                    registry.register_builtin(type_url);
                }
                registry
            }
        }
    }

    /// Default encoders with this configuration's overrides applied.
    pub fn build_encoders(&self) -> MessageEncoders {
        let unpacker = Arc::new(self.type_registry());
        let mut encoders = MessageEncoders::new(
            unpacker.clone(),
            Arc::new(FixedPortSource::new(self.transfer_port.clone())),
        );
        if self.gas_multiplier != DEFAULT_GAS_MULTIPLIER {
            encoders = encoders.merge(Some(PartialEncoders {
                any: Some(any::encoder(unpacker, self.gas_multiplier)),
                ..Default::default()
            }));
        }
        for kind in &self.disabled_kinds {
            encoders = encoders.merge(Some(PartialEncoders::reject(*kind)));
        }
        encoders
    }
}
