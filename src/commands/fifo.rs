//! FIFO commands
//!
//! Both FIFOs hold up to three payloads of at most 32 bytes.

use crate::{opcode, Command, NoParameters};

/// FLUSH_TX command (0xE1)
///
/// Discards every payload in the TX FIFO.
///
/// # Important Notes
/// - Used in TX mode
/// - Also discards a payload that is waiting for its acknowledgement
#[derive(Debug, Clone)]
pub struct FlushTx;

impl Command for FlushTx {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::FLUSH_TX
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// FLUSH_RX command (0xE2)
///
/// Discards every payload in the RX FIFO.
///
/// # Important Notes
/// - Should not be issued while an acknowledgement is being sent
#[derive(Debug, Clone)]
pub struct FlushRx;

impl Command for FlushRx {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::FLUSH_RX
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// REUSE_TX_PL command (0xE3)
///
/// Keeps retransmitting the last payload for as long as chip-enable is
/// high, until FLUSH_TX or a new payload write.
#[derive(Debug, Clone)]
pub struct ReuseTx;

impl Command for ReuseTx {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        opcode::REUSE_TX_PL
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}
