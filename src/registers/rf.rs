//! RF-related registers
//!
//! This module contains registers that shape the air link:
//! - Automatic retransmission delay and count
//! - RF channel selection
//! - Data rate, output power and LNA gain

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Automatic retransmission register (address: 0x04)
///
/// # Bit layout
/// - Bits 7:4: delay, `(delay_us / 250) - 1`
/// - Bits 3:0: retransmit count, 0 disables retransmission
///
/// # Important Notes
/// - Delay must be a multiple of 250µs between 250µs and 4000µs
/// - Count ranges 0..=15
/// - A disabled value keeps its delay but encodes a count of 0
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoRetry {
    delay_us: u16,
    count: u8,
    disabled: bool,
}

impl AutoRetry {
    pub const DELAY_STEP_US: u16 = 250;
    pub const MAX_DELAY_US: u16 = 4000;
    pub const MAX_COUNT: u8 = 15;

    /// Creates a retransmission setting. Ranges are checked when the value
    /// is written through [`Nrf24::set_auto_retry`](crate::Nrf24::set_auto_retry).
    pub fn new(delay_us: u16, count: u8) -> Self {
        Self {
            delay_us,
            count,
            disabled: count == 0,
        }
    }

    /// Delay between retransmissions in microseconds
    pub fn delay_us(&self) -> u16 {
        self.delay_us
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn with_delay_us(self, delay_us: u16) -> Self {
        Self { delay_us, ..self }
    }

    pub fn with_count(self, count: u8) -> Self {
        Self { count, ..self }
    }

    pub fn with_disabled(self, disabled: bool) -> Self {
        Self { disabled, ..self }
    }
}

impl Default for AutoRetry {
    fn default() -> Self {
        Self::new(250, 3)
    }
}

impl FromByteArray for AutoRetry {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let delay_us = ((bytes[0] >> 4) as u16 + 1) * Self::DELAY_STEP_US;
        Ok(Self::new(delay_us, bytes[0] & 0x0F))
    }
}

impl ToByteArray for AutoRetry {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let delay = (self.delay_us / Self::DELAY_STEP_US).saturating_sub(1) as u8;
        let count = if self.disabled { 0 } else { self.count & 0x0F };
        Ok([((delay & 0x0F) << 4) | count])
    }
}

/// RF channel register (address: 0x05)
///
/// The carrier frequency is `2400 + channel` MHz. The chip accepts up to
/// 127; the driver restricts writes to 0..=83 to stay inside the ISM band.
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfChannel {
    pub channel: u8,
}

impl RfChannel {
    pub const MAX: u8 = 83;
}

impl Default for RfChannel {
    fn default() -> Self {
        Self { channel: 2 }
    }
}

impl FromByteArray for RfChannel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            channel: bytes[0] & 0x7F,
        })
    }
}

impl ToByteArray for RfChannel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.channel & 0x7F])
    }
}

/// Air data rate (RF_SETUP bit 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitRate {
    OneMbps = 0x0,
    #[default]
    TwoMbps = 0x1,
}

/// PA output power (RF_SETUP bits 2:1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfPower {
    Minus18dBm = 0x0,
    Minus12dBm = 0x1,
    Minus6dBm = 0x2,
    #[default]
    Minus0dBm = 0x3,
}

impl RfPower {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0x0 => Self::Minus18dBm,
            0x1 => Self::Minus12dBm,
            0x2 => Self::Minus6dBm,
            _ => Self::Minus0dBm,
        }
    }
}

/// RF setup register (address: 0x06)
///
/// # Bit layout
/// - Bit 3: data rate
/// - Bits 2:1: output power
/// - Bit 0: LNA gain
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfConfig {
    bit_rate: BitRate,
    power: RfPower,
    lna_gain: bool,
}

impl RfConfig {
    pub fn bit_rate(&self) -> BitRate {
        self.bit_rate
    }

    pub fn power(&self) -> RfPower {
        self.power
    }

    pub fn lna_gain(&self) -> bool {
        self.lna_gain
    }

    pub fn with_bit_rate(self, bit_rate: BitRate) -> Self {
        Self { bit_rate, ..self }
    }

    pub fn with_power(self, power: RfPower) -> Self {
        Self { power, ..self }
    }

    pub fn with_lna_gain(self, lna_gain: bool) -> Self {
        Self { lna_gain, ..self }
    }
}

impl Default for RfConfig {
    fn default() -> Self {
        Self {
            bit_rate: BitRate::TwoMbps,
            power: RfPower::Minus0dBm,
            lna_gain: true,
        }
    }
}

impl FromByteArray for RfConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            bit_rate: if bytes[0] & 0x08 != 0 {
                BitRate::TwoMbps
            } else {
                BitRate::OneMbps
            },
            power: RfPower::from_bits(bytes[0] >> 1),
            lna_gain: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for RfConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.bit_rate as u8) << 3) | ((self.power as u8) << 1) | self.lna_gain as u8])
    }
}
