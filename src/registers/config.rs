//! Configuration register
//!
//! CONFIG (0x00) carries the interrupt masks, the CRC scheme and the
//! power/direction bits that together form the transceiver [`Mode`].
//! The interrupt masks are stored inverted on the chip: a set mask bit
//! silences the IRQ line for that source. [`Config`] exposes the positive
//! view (the set of *enabled* interrupts).

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// Interrupt sources of the transceiver
    ///
    /// The same three bits appear in CONFIG (as masks, shifted by 4),
    /// in STATUS (as pending flags, shifted by 4) and in the
    /// write-one-to-clear mask passed to
    /// [`Nrf24::clear_interrupts`](crate::Nrf24::clear_interrupts).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        /// A packet arrived in the RX FIFO (RX_DR)
        const RX_DATA_READY = 0x04;
        /// A packet left the TX FIFO and was acknowledged if required (TX_DS)
        const TX_DATA_SENT = 0x02;
        /// Auto-retransmit gave up after the configured count (MAX_RT)
        const TX_RETRY_FAILED = 0x01;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Interrupt {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Interrupt({=u8:#x})", self.bits())
    }
}

/// CRC scheme (CONFIG bits 3:2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Crc {
    /// CRC disabled. Forced on by the chip whenever auto-ack is enabled.
    None = 0x0,
    /// 8-bit CRC
    #[default]
    OneByte = 0x2,
    /// 16-bit CRC
    TwoByte = 0x3,
}

impl Crc {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0x3 => Self::TwoByte,
            0x2 => Self::OneByte,
            // EN_CRC clear: the CRCO bit is ignored by the chip
            _ => Self::None,
        }
    }
}

/// Transceiver mode (CONFIG bits 1:0, PWR_UP and PRIM_RX)
///
/// The mode is the only state the driver's guarded operations depend on.
/// It changes exclusively through a write of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Powered down
    #[default]
    Off = 0x0,
    /// Powered up, primary transmitter
    Transmit = 0x2,
    /// Powered up, primary receiver
    Receive = 0x3,
}

impl Mode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0x3 => Self::Receive,
            0x2 => Self::Transmit,
            // PRIM_RX without PWR_UP is still powered down
            _ => Self::Off,
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Mode::Off => "off",
            Mode::Transmit => "transmit",
            Mode::Receive => "receive",
        };
        f.write_str(name)
    }
}

/// Configuration register (address: 0x00)
///
/// # Bit layout
/// - Bit 7: reserved
/// - Bits 6:4: interrupt masks (MASK_RX_DR, MASK_TX_DS, MASK_MAX_RT), inverted
/// - Bits 3:2: CRC scheme
/// - Bits 1:0: mode
///
/// Values are immutable; use the `with_*` functions to derive a new value.
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    interrupts: Interrupt,
    crc: Crc,
    mode: Mode,
}

impl Config {
    /// Interrupt sources routed to the IRQ pin
    pub fn interrupts(&self) -> Interrupt {
        self.interrupts
    }

    pub fn crc(&self) -> Crc {
        self.crc
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn with_interrupts(self, interrupts: Interrupt) -> Self {
        Self { interrupts, ..self }
    }

    pub fn with_crc(self, crc: Crc) -> Self {
        Self { crc, ..self }
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interrupts: Interrupt::all(),
            crc: Crc::OneByte,
            mode: Mode::Off,
        }
    }
}

impl FromByteArray for Config {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            interrupts: Interrupt::from_bits_truncate(!(bytes[0] >> 4)),
            crc: Crc::from_bits(bytes[0] >> 2),
            mode: Mode::from_bits(bytes[0]),
        })
    }
}

impl ToByteArray for Config {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((!self.interrupts.bits() & 0x7) << 4)
            | ((self.crc as u8) << 2)
            | (self.mode as u8)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encode_is_stable_for_every_raw_byte() {
        for raw in 0..=u8::MAX {
            let value = Config::from_bytes([raw]).unwrap();
            let again = Config::from_bytes(value.to_bytes().unwrap()).unwrap();
            assert_eq!(value, again, "raw {raw:#04x}");
        }
    }

    #[test]
    fn default_enables_every_interrupt() {
        // masks clear, EN_CRC set, powered down
        assert_eq!(Config::default().to_bytes().unwrap(), [0x08]);
    }

    #[test]
    fn masks_are_inverted() {
        let config = Config::default()
            .with_interrupts(Interrupt::RX_DATA_READY)
            .with_crc(Crc::TwoByte)
            .with_mode(Mode::Receive);
        // MAX_RT and TX_DS masked, RX_DR unmasked
        assert_eq!(config.to_bytes().unwrap(), [0x3F]);
    }

    #[test]
    fn power_down_with_prim_rx_is_off() {
        let config = Config::from_bytes([0x01]).unwrap();
        assert_eq!(config.mode(), Mode::Off);
    }
}
