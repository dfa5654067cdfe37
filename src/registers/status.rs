//! Status registers
//!
//! Read-mostly registers reporting the transceiver's state:
//! - STATUS (0x07): pending interrupts, pipe at the RX FIFO head, TX FIFO full
//! - OBSERVE_TX (0x08): lost packet and retransmission counters
//! - RPD (0x09): received power detector / carrier detect
//! - FIFO_STATUS (0x17): TX and RX FIFO occupancy
//!
//! STATUS is also clocked out as the first byte of every SPI transaction,
//! which is why [`Status`] appears in every command response.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::{Interrupt, PIPE_COUNT};

/// Status register (address: 0x07)
///
/// # Bit layout
/// - Bit 7: reserved
/// - Bits 6:4: pending interrupts (RX_DR, TX_DS, MAX_RT)
/// - Bits 3:1: pipe number of the payload at the RX FIFO head, 0b111 when empty
/// - Bit 0: TX FIFO full
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    interrupts: Interrupt,
    rx_ready_pipe: Option<usize>,
    tx_full: bool,
}

impl Status {
    pub fn new(interrupts: Interrupt, rx_ready_pipe: Option<usize>, tx_full: bool) -> Self {
        Self {
            interrupts,
            rx_ready_pipe: rx_ready_pipe.filter(|&pipe| pipe < PIPE_COUNT),
            tx_full,
        }
    }

    /// Interrupts currently pending
    pub fn interrupts(&self) -> Interrupt {
        self.interrupts
    }

    /// Pipe whose payload sits at the head of the RX FIFO, `None` when the FIFO is empty
    pub fn rx_ready_pipe(&self) -> Option<usize> {
        self.rx_ready_pipe
    }

    pub fn tx_full(&self) -> bool {
        self.tx_full
    }

    pub fn rx_data_ready(&self) -> bool {
        self.interrupts.contains(Interrupt::RX_DATA_READY)
    }

    pub fn tx_data_sent(&self) -> bool {
        self.interrupts.contains(Interrupt::TX_DATA_SENT)
    }

    pub fn tx_retry_failed(&self) -> bool {
        self.interrupts.contains(Interrupt::TX_RETRY_FAILED)
    }

    /// Decodes the STATUS byte clocked out at the start of a transaction
    pub fn from_byte(byte: u8) -> Self {
        let pipe = ((byte >> 1) & 0x07) as usize;
        Self::new(
            Interrupt::from_bits_truncate(byte >> 4),
            Some(pipe),
            byte & 0x01 != 0,
        )
    }

    pub fn to_byte(self) -> u8 {
        let pipe = self.rx_ready_pipe.map_or(0x07, |pipe| pipe as u8);
        ((self.interrupts.bits() & 0x07) << 4) | (pipe << 1) | self.tx_full as u8
    }
}

impl FromByteArray for Status {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_byte(bytes[0]))
    }
}

impl ToByteArray for Status {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

/// Interrupt clear mask, written to the status register (address: 0x07)
///
/// STATUS interrupt bits are write-one-to-clear; the other bits are read-only.
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptClear {
    pub mask: Interrupt,
}

impl ToByteArray for InterruptClear {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.mask.bits() & 0x07) << 4])
    }
}

/// Transmit observation register (address: 0x08)
///
/// # Important Notes
/// - `lost_packets` saturates at 15 and resets on an RF channel write
/// - `retransmits` resets when a new packet transmission starts
#[register(0x08u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    pub lost_packets: u8,
    pub retransmits: u8,
}

impl FromByteArray for TxStats {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            lost_packets: bytes[0] >> 4,
            retransmits: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for TxStats {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.lost_packets & 0x0F) << 4) | (self.retransmits & 0x0F)])
    }
}

/// Carrier detect register (address: 0x09)
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarrierDetect {
    pub detected: bool,
}

impl FromByteArray for CarrierDetect {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            detected: bytes[0] & 0x01 != 0,
        })
    }
}

/// FIFO status register (address: 0x17)
#[register(0x17u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoStatus {
    /// The last TX payload is being reused (REUSE_TX_PL)
    pub tx_reuse: bool,
    pub tx_full: bool,
    pub tx_empty: bool,
    pub rx_full: bool,
    pub rx_empty: bool,
}

impl FromByteArray for FifoStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_reuse: bytes[0] & 0x40 != 0,
            tx_full: bytes[0] & 0x20 != 0,
            tx_empty: bytes[0] & 0x10 != 0,
            rx_full: bytes[0] & 0x02 != 0,
            rx_empty: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for FifoStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.tx_reuse as u8) << 6)
            | ((self.tx_full as u8) << 5)
            | ((self.tx_empty as u8) << 4)
            | ((self.rx_full as u8) << 1)
            | self.rx_empty as u8])
    }
}
