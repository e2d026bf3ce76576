use crate::{context::OutOfGas, unpacker::UnpackError};
use thiserror::Error;
use vmgate_types::decimal::DecimalError;

/// Reasons a VM message cannot be turned into host messages.
///
/// Every failure aborts the whole dispatch; encoders never return partial output.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unknown message: {0}")]
    UnknownKind(String),
    #[error("cannot parse amount '{amount}' for denom '{denom}'")]
    AmountParse { amount: String, denom: String },
    #[error("invalid denom '{denom}'")]
    InvalidDenom { denom: String },
    #[error("cannot unpack message with type URL {type_url}: {source}")]
    InvalidPayload {
        type_url: String,
        #[source]
        source: UnpackError,
    },
    #[error("unknown vote option: {option}")]
    InvalidVoteOption { option: String },
    #[error("weight for vote {index}: {source}")]
    InvalidWeight {
        index: usize,
        #[source]
        source: DecimalError,
    },
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),
    #[error(transparent)]
    OutOfGas(#[from] OutOfGas),
}

impl EncodeError {
    /// Stable machine-readable reason, suitable for metrics labels and events.
    pub fn code(&self) -> &'static str {
        match self {
            EncodeError::UnknownKind(_) => "unknown_kind",
            EncodeError::AmountParse { .. } => "amount_parse",
            EncodeError::InvalidDenom { .. } => "invalid_denom",
            EncodeError::InvalidPayload { .. } => "invalid_payload",
            EncodeError::InvalidVoteOption { .. } => "invalid_vote_option",
            EncodeError::InvalidWeight { .. } => "invalid_weight",
            EncodeError::UnsupportedFeature(_) => "unsupported_feature",
            EncodeError::OutOfGas(_) => "out_of_gas",
        }
    }

    pub(crate) fn unknown(what: impl Into<String>) -> Self {
        EncodeError::UnknownKind(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_error_names_the_option() {
        let err = EncodeError::InvalidWeight {
            index: 2,
            source: DecimalError::Empty,
        };
        assert_eq!(err.to_string(), "weight for vote 2: decimal string is empty");
        assert_eq!(err.code(), "invalid_weight");
    }

    #[test]
    fn out_of_gas_is_transparent() {
        let err = EncodeError::from(OutOfGas {
            descriptor: "unpacking AnyMsg".to_string(),
            required: 5,
            available: 0,
        });
        assert_eq!(
            err.to_string(),
            "out of gas in unpacking AnyMsg: required 5, available 0"
        );
        assert_eq!(err.code(), "out_of_gas");
    }
}
