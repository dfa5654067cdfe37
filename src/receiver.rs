//! Per-pipe packet consumer
//!
//! A [`PipeReceiver`] owns one receive pipe: it writes the pipe's address
//! and payload length, enables the pipe and subscribes to receive-ready
//! interrupts. Each interrupt drains the RX FIFO for as long as STATUS
//! reports a payload from that pipe at its head, so a burst of packets
//! raising a single interrupt is consumed in full.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::trace;

use crate::address::Address;
use crate::device::MAX_PAYLOAD;
use crate::error::RangeError;
use crate::interrupts::InterruptKind;
use crate::radio::{DriverError, Nrf24};
use crate::registers::{PipeFlags, PIPE_COUNT};

/// Receive configuration of one pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeReceiver {
    pipe: usize,
    address: Address,
    len: usize,
}

impl PipeReceiver {
    /// Describes `pipe` listening on `address` for payloads of `len`
    /// bytes, 0 for dynamic payloads.
    pub fn new(pipe: usize, address: Address, len: usize) -> Result<Self, RangeError> {
        if pipe >= PIPE_COUNT {
            return Err(RangeError::Pipe(pipe));
        }
        if len > MAX_PAYLOAD {
            return Err(RangeError::PayloadLength(len));
        }
        Ok(Self { pipe, address, len })
    }

    /// Pipe index, 0 to 5
    pub fn pipe(&self) -> usize {
        self.pipe
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Configures the pipe on `radio` and hands every packet it receives
    /// to `consumer`, sliced to the payload length.
    pub fn subscribe<SPI, CE, F>(self, radio: &mut Nrf24<SPI, CE>, mut consumer: F) -> Result<(), DriverError<SPI, CE>>
    where
        SPI: SpiDevice,
        CE: OutputPin,
        F: FnMut(&[u8]) + Send + 'static,
    {
        let Self { pipe, address, len } = self;

        radio.set_rx_address(pipe, address)?;
        radio.set_rx_length(pipe, len)?;
        let enabled = radio.rx_enabled()?;
        radio.set_rx_enabled(enabled | PipeFlags::from_bits_truncate(1 << pipe))?;

        radio.on_interrupt(InterruptKind::RxDataReady, move |radio, mut status| {
            let mut buffer = [0u8; MAX_PAYLOAD];
            while status.rx_ready_pipe() == Some(pipe) {
                let packet_len = match len {
                    0 => radio.rx_dynamic_length()?,
                    len => len,
                };
                radio.receive_packet(&mut buffer, packet_len)?;
                trace!("pipe {pipe}: {packet_len} byte packet");
                consumer(&buffer[..packet_len]);
                status = radio.status()?;
            }
            Ok(())
        });
        Ok(())
    }
}
