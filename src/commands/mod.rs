//! SPI command implementations
//!
//! Every transaction with the nRF24L01+ starts with a one-byte opcode
//! followed by zero or more data bytes. The chip clocks out STATUS while
//! the opcode is shifted in, so every command yields a status snapshot.
//!
//! # Command Categories
//! - [`fifo`]: FIFO maintenance (flush and reuse)
//! - [`status`]: status sampling and dynamic payload width
//!
//! Register access and payload transfers have a length that depends on
//! the register or payload, so they are issued through the raw transfers
//! of [`Device`](crate::Device) using the opcodes in [`opcode`].
//!
//! # Important Notes
//! - Register writes only take effect in power down or standby modes
//! - Payload reads pop the RX FIFO head; payload writes push the TX FIFO
//! - Dynamic payload width is only meaningful with EN_DPL set

mod fifo;
mod status;

pub use fifo::*;
pub use status::*;

/// Command opcodes
pub mod opcode {
    /// Read register, OR-ed with the 5-bit register address
    pub const R_REGISTER: u8 = 0x00;
    /// Write register, OR-ed with the 5-bit register address
    pub const W_REGISTER: u8 = 0x20;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const W_TX_PAYLOAD_NO_ACK: u8 = 0xB0;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const REUSE_TX_PL: u8 = 0xE3;
    pub const R_RX_PL_WID: u8 = 0x60;
    pub const NOP: u8 = 0xFF;

    /// Mask of the register address field in register commands
    pub const REGISTER_MASK: u8 = 0x1F;
}
