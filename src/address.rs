//! Pipe addresses
//!
//! An address is 3 to 5 bytes, written most significant byte first as in
//! `b"nrf01"`. On the wire the chip expects the least significant byte
//! first, so register transfers reverse the byte order.
//!
//! Pipes 0 and 1 each own a full address. Pipes 2 to 5 only store their
//! least significant byte and borrow the remaining bytes from pipe 1.

use core::fmt;

use crate::error::RangeError;

/// Pipe or transmit address of 3 to 5 bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    bytes: [u8; Address::MAX_LEN],
    len: u8,
}

impl Address {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 5;

    /// Creates an address from its bytes, most significant first
    pub fn new(bytes: &[u8]) -> Result<Self, RangeError> {
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&bytes.len()) {
            return Err(RangeError::AddressLength(bytes.len()));
        }
        let mut address = Self {
            bytes: [0; Self::MAX_LEN],
            len: bytes.len() as u8,
        };
        address.bytes[..bytes.len()].copy_from_slice(bytes);
        Ok(address)
    }

    /// Rebuilds an address from register bytes, least significant first
    pub fn from_wire(wire: &[u8]) -> Result<Self, RangeError> {
        let mut address = Self::new(wire)?;
        address.bytes[..wire.len()].reverse();
        Ok(address)
    }

    /// Writes the register representation, least significant first, into
    /// `wire` and returns the number of bytes used
    pub fn to_wire(&self, wire: &mut [u8; Self::MAX_LEN]) -> usize {
        for (dst, src) in wire.iter_mut().zip(self.as_bytes().iter().rev()) {
            *dst = *src;
        }
        self.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Least significant byte, the only byte stored for pipes 2 to 5
    pub fn lsb(&self) -> u8 {
        self.bytes[self.len() - 1]
    }

    /// Returns a copy with the least significant byte replaced
    pub fn with_lsb(self, lsb: u8) -> Self {
        let mut address = self;
        address.bytes[self.len() - 1] = lsb;
        address
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = RangeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl<const N: usize> TryFrom<&[u8; N]> for Address {
    type Error = RangeError;

    fn try_from(bytes: &[u8; N]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl TryFrom<&str> for Address {
    type Error = RangeError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text.as_bytes())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.as_bytes().iter().all(|b| b.is_ascii_graphic()) {
            for &b in self.as_bytes() {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            for b in self.as_bytes() {
                write!(f, "{b:02X}")?;
            }
            Ok(())
        }
    }
}
