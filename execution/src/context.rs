//! Gas metering and the per-dispatch execution context.

use thiserror::Error;

/// Cost of unpacking a generic message, in VM gas units.
pub const ANY_MSG_GAS_COST: u64 = 700_000;

/// VM gas units per host gas unit.
pub const DEFAULT_GAS_MULTIPLIER: u64 = 140_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("out of gas in {descriptor}: required {required}, available {available}")]
pub struct OutOfGas {
    pub descriptor: String,
    pub required: u64,
    pub available: u64,
}

/// Host gas accounting for the current transaction.
pub trait GasMeter {
    /// Charges `amount`, failing without charging when the limit would be exceeded.
    fn consume_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), OutOfGas>;

    fn gas_consumed(&self) -> u64;

    fn gas_limit(&self) -> u64;

    fn gas_remaining(&self) -> u64 {
        self.gas_limit().saturating_sub(self.gas_consumed())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicGasMeter {
    limit: u64,
    consumed: u64,
}

impl BasicGasMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    pub fn infinite() -> Self {
        Self::new(u64::MAX)
    }
}

impl GasMeter for BasicGasMeter {
    fn consume_gas(&mut self, amount: u64, descriptor: &str) -> Result<(), OutOfGas> {
        match self.consumed.checked_add(amount) {
            Some(total) if total <= self.limit => {
                self.consumed = total;
                Ok(())
            }
            _ => Err(OutOfGas {
                descriptor: descriptor.to_string(),
                required: amount,
                available: self.gas_remaining(),
            }),
        }
    }

    fn gas_consumed(&self) -> u64 {
        self.consumed
    }

    fn gas_limit(&self) -> u64 {
        self.limit
    }
}

/// Host state visible to encoders during one dispatch.
pub trait ExecutionContext {
    fn gas_meter(&mut self) -> &mut dyn GasMeter;

    fn block_height(&self) -> u64;
}

/// Context backed by a [`BasicGasMeter`] at a fixed height.
#[derive(Clone, Debug)]
pub struct SimpleContext {
    meter: BasicGasMeter,
    height: u64,
}

impl SimpleContext {
    pub fn new(meter: BasicGasMeter, height: u64) -> Self {
        Self { meter, height }
    }

    pub fn meter(&self) -> &BasicGasMeter {
        &self.meter
    }
}

impl ExecutionContext for SimpleContext {
    fn gas_meter(&mut self) -> &mut dyn GasMeter {
        &mut self.meter
    }

    fn block_height(&self) -> u64 {
        self.height
    }
}

/// Resolves the port used as the source of token transfers.
pub trait TransferPortSource: Send + Sync {
    fn port(&self, ctx: &dyn ExecutionContext) -> String;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedPortSource {
    port: String,
}

impl FixedPortSource {
    pub fn new(port: impl Into<String>) -> Self {
        Self { port: port.into() }
    }
}

impl TransferPortSource for FixedPortSource {
    fn port(&self, _: &dyn ExecutionContext) -> String {
        self.port.clone()
    }
}
