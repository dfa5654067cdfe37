//! Status commands

use core::convert::Infallible;

use regiface::FromByteArray;

use crate::{opcode, Command, NoParameters};

/// NOP command (0xFF)
///
/// Does nothing but clock out STATUS, which makes it the cheapest way
/// to sample the pending interrupts.
#[derive(Debug, Clone)]
pub struct Nop;

impl Command for Nop {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::NOP
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Dynamic payload width response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadWidth {
    /// Width of the payload at the RX FIFO head in bytes.
    /// Values above 32 indicate a corrupted packet that must be flushed.
    pub width: u8,
}

impl FromByteArray for PayloadWidth {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { width: bytes[0] })
    }
}

/// R_RX_PL_WID command (0x60)
///
/// Returns the width of the payload at the RX FIFO head.
///
/// # Important Notes
/// - Requires dynamic payload length (FEATURE.EN_DPL)
/// - Flush the RX FIFO if the width exceeds 32 bytes
#[derive(Debug, Clone)]
pub struct ReadRxPayloadWidth;

impl Command for ReadRxPayloadWidth {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = PayloadWidth;

    fn id() -> Self::IdType {
        opcode::R_RX_PL_WID
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}
