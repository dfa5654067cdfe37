//! Feature register

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Feature register (address: 0x1D)
///
/// # Bit layout
/// - Bit 2: EN_DPL, dynamic payload length
/// - Bit 1: EN_ACK_PAY, payload with acknowledgement
/// - Bit 0: EN_DYN_ACK, allows the no-ack TX payload command
///
/// # Important Notes
/// - Per-pipe dynamic payload additionally needs the pipe's DYNPD bit
/// - With `disable_ack` set, TX payloads go out without requesting an
///   acknowledgement and auto-ack must be off on pipe 0
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Feature {
    dyn_payload: bool,
    ack_payload: bool,
    disable_ack: bool,
}

impl Feature {
    pub fn dyn_payload(&self) -> bool {
        self.dyn_payload
    }

    pub fn ack_payload(&self) -> bool {
        self.ack_payload
    }

    pub fn disable_ack(&self) -> bool {
        self.disable_ack
    }

    pub fn with_dyn_payload(self, dyn_payload: bool) -> Self {
        Self { dyn_payload, ..self }
    }

    pub fn with_ack_payload(self, ack_payload: bool) -> Self {
        Self { ack_payload, ..self }
    }

    pub fn with_disable_ack(self, disable_ack: bool) -> Self {
        Self { disable_ack, ..self }
    }
}

impl FromByteArray for Feature {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dyn_payload: bytes[0] & 0x04 != 0,
            ack_payload: bytes[0] & 0x02 != 0,
            disable_ack: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for Feature {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.dyn_payload as u8) << 2) | ((self.ack_payload as u8) << 1) | self.disable_ack as u8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encode_is_stable_for_every_raw_byte() {
        for raw in 0..=u8::MAX {
            let feature = Feature::from_bytes([raw]).unwrap();
            assert_eq!(Feature::from_bytes(feature.to_bytes().unwrap()).unwrap(), feature);
        }
    }

    #[test]
    fn flags_map_to_their_bits() {
        let feature = Feature::default().with_dyn_payload(true).with_disable_ack(true);
        assert_eq!(feature.to_bytes().unwrap(), [0x05]);
        assert!(!feature.ack_payload());
    }
}
