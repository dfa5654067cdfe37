//! Error types
//!
//! Errors fall into four groups:
//! - [`RangeError`]: a parameter outside what the chip supports, reported
//!   before anything is sent on the bus
//! - [`StateError`]: an operation that is illegal in the current mode, or a
//!   configuration that [`Nrf24::validate`](crate::Nrf24::validate) rejects
//! - transport errors: SPI and chip-enable failures, carried unmodified in
//!   [`Error::Bus`] and [`Error::Pin`] and never retried
//! - [`ReactorError`]: reactor registration and lifecycle failures

use std::io;

use thiserror::Error;

use crate::device::DeviceError;
use crate::registers::Mode;

/// Error raised inside a reactor predicate or callback
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Driver error, generic over the SPI error `S` and the chip-enable pin error `P`
#[derive(Debug, Error)]
pub enum Error<S, P> {
    #[error("SPI transaction failed: {0:?}")]
    Bus(S),
    #[error("chip-enable pin failed: {0:?}")]
    Pin(P),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    State(#[from] StateError),
    /// The chip returned a register value with no valid decoding
    #[error("register {register:#04x} holds an undecodable value {value:#04x}")]
    Decode { register: u8, value: u8 },
}

impl<S, P> From<DeviceError<S>> for Error<S, P> {
    fn from(error: DeviceError<S>) -> Self {
        match error {
            DeviceError::Bus(error) => Error::Bus(error),
            DeviceError::Decode { register, value } => Error::Decode { register, value },
            DeviceError::Length(len) => Error::Range(RangeError::PayloadLength(len)),
        }
    }
}

/// Parameter outside the range the transceiver supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("pipe {0} is out of range 0..=5")]
    Pipe(usize),
    #[error("address length {0} is out of range 3..=5")]
    AddressLength(usize),
    #[error("address width {0} is out of range 3..=5")]
    AddressWidth(usize),
    #[error("RF channel {0} is out of range 0..=83")]
    Channel(u8),
    #[error("retry delay {0}us is not a multiple of 250us in 250..=4000")]
    RetryDelay(u16),
    #[error("retry count {0} is out of range 0..=15")]
    RetryCount(u8),
    #[error("payload length {0} is out of range (at most 32 bytes and within the buffer)")]
    PayloadLength(usize),
}

/// Operation illegal for the current configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("transceiver is in {actual} mode, operation requires {expected} mode")]
    WrongMode { expected: Mode, actual: Mode },
    #[error("validation requires transmit or receive mode")]
    InvalidMode,
    #[error("enabled pipes {first} and {second} share address LSB {lsb:#04x}")]
    DuplicateAddressLsb { first: usize, second: usize, lsb: u8 },
    #[error("{target} address is {length} bytes but the address width is {width}")]
    AddressWidthMismatch {
        target: AddressTarget,
        length: usize,
        width: usize,
    },
    #[error("auto-ack must be disabled on pipe 0 when the disable-ack feature is set")]
    AutoAckWithAckDisabled,
    #[error("dynamic payload is not enabled for pipe {pipe}")]
    DynamicPayloadDisabled { pipe: usize },
    #[error("the dynamic payload feature is not enabled")]
    DynamicPayloadInactive,
}

/// Address register named in an [`StateError::AddressWidthMismatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressTarget {
    Rx(usize),
    Tx,
}

impl core::fmt::Display for AddressTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AddressTarget::Rx(pipe) => write!(f, "RX pipe {pipe}"),
            AddressTarget::Tx => f.write_str("TX"),
        }
    }
}

/// Reactor registration and lifecycle error
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("selector failure: {0}")]
    Io(#[from] io::Error),
    #[error("handle {0} is already registered")]
    AlreadyRegistered(i32),
    /// The background loop stopped because a predicate or callback failed
    #[error("reactor loop terminated by a failing callback: {0}")]
    Faulted(String),
    #[error("reactor registry lock poisoned")]
    Poisoned,
    /// An iteration was started from a predicate or callback of the
    /// iteration already running on this thread
    #[error("reactor iteration started from its own callback")]
    Reentrant,
}
