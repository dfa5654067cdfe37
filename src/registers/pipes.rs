//! Per-pipe registers
//!
//! Three registers share the same layout, one bit per receive pipe:
//! - EN_AA (0x01): auto-acknowledgement
//! - EN_RXADDR (0x02): pipe enabled for reception
//! - DYNPD (0x1C): dynamic payload length
//!
//! SETUP_AW (0x03) holds the address width shared by every pipe.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Number of receive pipes on the transceiver
pub const PIPE_COUNT: usize = 6;

bitflags! {
    /// Set of receive pipes, bit `i` standing for pipe `i`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PipeFlags: u8 {
        const PIPE0 = 1 << 0;
        const PIPE1 = 1 << 1;
        const PIPE2 = 1 << 2;
        const PIPE3 = 1 << 3;
        const PIPE4 = 1 << 4;
        const PIPE5 = 1 << 5;
    }
}

impl PipeFlags {
    /// Returns whether `pipe` is in the set. Indices above 5 are never set.
    pub fn pipe(&self, pipe: usize) -> bool {
        pipe < PIPE_COUNT && self.bits() & (1 << pipe) != 0
    }

    /// Returns a copy with `pipe` added or removed. Indices above 5 are ignored.
    pub fn with_pipe(self, pipe: usize, enabled: bool) -> Self {
        if pipe >= PIPE_COUNT {
            return self;
        }
        let bit = Self::from_bits_truncate(1 << pipe);
        if enabled {
            self | bit
        } else {
            self - bit
        }
    }

    /// Iterates the indices of the pipes in the set, lowest first
    pub fn pipes(self) -> impl Iterator<Item = usize> {
        (0..PIPE_COUNT).filter(move |&pipe| self.pipe(pipe))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipeFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PipeFlags({=u8:#08b})", self.bits())
    }
}

impl FromByteArray for PipeFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits_truncate(bytes[0]))
    }
}

impl ToByteArray for PipeFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

macro_rules! pipe_register {
    ($(#[$doc:meta])* $name:ident, $addr:tt, $default:expr) => {
        $(#[$doc])*
        #[register($addr)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name {
            pub pipes: PipeFlags,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { pipes: $default }
            }
        }

        impl From<PipeFlags> for $name {
            fn from(pipes: PipeFlags) -> Self {
                Self { pipes }
            }
        }

        impl FromByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                PipeFlags::from_bytes(bytes).map(Self::from)
            }
        }

        impl ToByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                self.pipes.to_bytes()
            }
        }
    };
}

pipe_register!(
    /// Auto-acknowledgement register (address: 0x01)
    ///
    /// Enabled on every pipe after reset. Must be cleared on pipe 0 when
    /// the TX side sets [`Feature::disable_ack`](crate::registers::Feature::disable_ack).
    AutoAck,
    0x01u8,
    PipeFlags::all()
);

pipe_register!(
    /// Enabled RX addresses register (address: 0x02)
    ///
    /// Pipes 0 and 1 are enabled after reset.
    RxEnabled,
    0x02u8,
    PipeFlags::PIPE0 | PipeFlags::PIPE1
);

pipe_register!(
    /// Dynamic payload register (address: 0x1C)
    ///
    /// Requires [`Feature::dyn_payload`](crate::registers::Feature::dyn_payload).
    DynPayload,
    0x1Cu8,
    PipeFlags::empty()
);

/// Error type for address width field values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAddressWidth(pub u8);

/// Address width register (address: 0x03)
///
/// The field encodes `width - 2`; the raw value 0 is illegal on the chip.
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressWidth {
    width: u8,
}

impl AddressWidth {
    pub const MIN: usize = 3;
    pub const MAX: usize = 5;

    /// Creates a width of 3, 4 or 5 bytes
    pub fn new(width: usize) -> Result<Self, InvalidAddressWidth> {
        if (Self::MIN..=Self::MAX).contains(&width) {
            Ok(Self { width: width as u8 })
        } else {
            Err(InvalidAddressWidth(width.min(u8::MAX as usize) as u8))
        }
    }

    /// Address width in bytes
    pub fn width(&self) -> usize {
        self.width as usize
    }
}

impl Default for AddressWidth {
    fn default() -> Self {
        Self { width: 5 }
    }
}

impl FromByteArray for AddressWidth {
    type Error = InvalidAddressWidth;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        match bytes[0] & 0x3 {
            0 => Err(InvalidAddressWidth(0)),
            field => Ok(Self { width: field + 2 }),
        }
    }
}

impl ToByteArray for AddressWidth {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.width - 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_pipe_toggles_only_its_own_bit() {
        for base in [PipeFlags::empty(), PipeFlags::all(), PipeFlags::from_bits_truncate(0x15)] {
            for pipe in 0..PIPE_COUNT {
                let on = base.with_pipe(pipe, true).to_bytes().unwrap()[0];
                let off = base.with_pipe(pipe, false).to_bytes().unwrap()[0];
                assert_eq!(on ^ off, 1 << pipe);
                assert_eq!(on & !(1 << pipe), base.bits() & !(1 << pipe));
                assert_eq!(off & !(1 << pipe), base.bits() & !(1 << pipe));
            }
        }
    }

    #[test]
    fn out_of_range_pipe_is_ignored() {
        let flags = PipeFlags::PIPE1.with_pipe(6, true);
        assert_eq!(flags, PipeFlags::PIPE1);
        assert!(!flags.pipe(7));
    }

    #[test]
    fn reserved_bits_are_dropped() {
        let auto_ack = AutoAck::from_bytes([0xFF]).unwrap();
        assert_eq!(auto_ack.pipes, PipeFlags::all());
        assert_eq!(auto_ack.to_bytes().unwrap(), [0x3F]);
    }

    #[test]
    fn pipes_iterates_in_order() {
        let flags = PipeFlags::PIPE4 | PipeFlags::PIPE0 | PipeFlags::PIPE2;
        assert!(flags.pipes().eq([0, 2, 4]));
    }

    #[test]
    fn address_width_field() {
        assert_eq!(AddressWidth::from_bytes([0x01]).unwrap().width(), 3);
        assert_eq!(AddressWidth::from_bytes([0x03]).unwrap().width(), 5);
        assert_eq!(AddressWidth::from_bytes([0x00]), Err(InvalidAddressWidth(0)));
        assert_eq!(AddressWidth::new(4).unwrap().to_bytes().unwrap(), [0x02]);
        assert!(AddressWidth::new(2).is_err());
        assert!(AddressWidth::new(6).is_err());
    }

    #[test]
    fn decode_encode_is_stable_for_every_raw_byte() {
        for raw in 0..=u8::MAX {
            let flags = PipeFlags::from_bytes([raw]).unwrap();
            assert_eq!(PipeFlags::from_bytes(flags.to_bytes().unwrap()).unwrap(), flags);
            let auto_ack = AutoAck::from_bytes([raw]).unwrap();
            assert_eq!(AutoAck::from_bytes(auto_ack.to_bytes().unwrap()).unwrap(), auto_ack);
            let enabled = RxEnabled::from_bytes([raw]).unwrap();
            assert_eq!(RxEnabled::from_bytes(enabled.to_bytes().unwrap()).unwrap(), enabled);
            let dynamic = DynPayload::from_bytes([raw]).unwrap();
            assert_eq!(DynPayload::from_bytes(dynamic.to_bytes().unwrap()).unwrap(), dynamic);

            match AddressWidth::from_bytes([raw]) {
                Ok(width) => {
                    assert_eq!(AddressWidth::from_bytes(width.to_bytes().unwrap()).unwrap(), width)
                }
                Err(error) => {
                    assert_eq!(raw & 0x3, 0);
                    assert_eq!(error, InvalidAddressWidth(0));
                }
            }
        }
    }

    #[test]
    fn defaults_match_reset_values() {
        assert_eq!(AutoAck::default().to_bytes().unwrap(), [0x3F]);
        assert_eq!(RxEnabled::default().to_bytes().unwrap(), [0x03]);
        assert_eq!(DynPayload::default().to_bytes().unwrap(), [0x00]);
        assert_eq!(AddressWidth::default().to_bytes().unwrap(), [0x03]);
    }
}
