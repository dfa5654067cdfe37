//! Register definitions for the nRF24L01+
//! Generated from the nRF24L01+ Product Specification v1.0, chapter 9

mod config;
mod feature;
mod pipes;
mod rf;
mod status;

pub use config::*;
pub use feature::*;
pub use pipes::*;
pub use rf::*;
pub use status::*;

/// Register addresses without a fixed-width value type
///
/// Addresses and per-pipe payload widths are accessed through raw
/// transfers because their register address depends on the pipe or their
/// length on the configured address width.
pub mod address {
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const TX_ADDR: u8 = 0x10;
    pub const RX_PW_P0: u8 = 0x11;
}
