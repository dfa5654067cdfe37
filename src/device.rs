//! nRF24L01+ SPI Device Interface
//!
//! This module provides the raw protocol layer for the nRF24L01+. Every
//! exchange is a single full-duplex transfer: the opcode byte and its data
//! bytes are shifted out while STATUS and the response bytes are shifted in.
//!
//! The interface is built around the `Device<SPI>` struct which wraps an SPI
//! interface and provides methods for:
//! - Reading and writing typed registers
//! - Reading and writing variable-length registers (addresses, pipe widths)
//! - Reading and writing payloads
//! - Executing fixed-size commands
//!
//! Errors from the SPI device are returned unmodified and never retried.
//!
//! # Example
//! ```no_run
//! use nrf24_reactor::{Device, registers::RfChannel};
//! # fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), nrf24_reactor::DeviceError<SPI::Error>> {
//! let mut device = Device::new(spi);
//!
//! let (status, channel): (_, RfChannel) = device.read_register()?;
//! device.write_register(RfChannel { channel: 76 })?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use regiface::{ByteArray, Command, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};
use thiserror::Error;

use crate::{opcode, registers::Status};

/// Largest payload the FIFOs accept
pub const MAX_PAYLOAD: usize = 32;

/// Error returned by the protocol layer
#[derive(Debug, Error)]
pub enum DeviceError<S> {
    /// SPI communication failed
    #[error("SPI transaction failed: {0:?}")]
    Bus(S),
    /// The chip returned bytes the register type cannot represent
    #[error("register {register:#04x} holds an undecodable value {value:#04x}")]
    Decode { register: u8, value: u8 },
    /// A transfer longer than the largest payload was requested
    #[error("transfer of {0} bytes exceeds the 32 byte payload limit")]
    Length(usize),
}

/// Raw protocol interface to the nRF24L01+.
///
/// This struct wraps an SPI interface and a 33-byte transfer buffer large
/// enough for an opcode followed by a full payload.
pub struct Device<SPI> {
    spi: SPI,
    buffer: [u8; MAX_PAYLOAD + 1],
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            buffer: [0; MAX_PAYLOAD + 1],
        }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Shifts out the opcode and `data_len` bytes already staged in the
    /// buffer, leaving the response in place.
    fn transfer(&mut self, opcode: u8, data_len: usize) -> Result<Status, DeviceError<SPI::Error>> {
        if data_len > MAX_PAYLOAD {
            return Err(DeviceError::Length(data_len));
        }
        self.buffer[0] = opcode;
        self.spi
            .transfer_in_place(&mut self.buffer[..=data_len])
            .map_err(DeviceError::Bus)?;
        Ok(Status::from_byte(self.buffer[0]))
    }

    /// Reads a register value from the device.
    ///
    /// # Errors
    /// * `DeviceError::Bus` - SPI communication failed
    /// * `DeviceError::Decode` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<(Status, R), DeviceError<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        let len = raw_value.as_ref().len();
        self.buffer[1..=len].fill(0);

        let status = self.transfer(opcode::R_REGISTER | (R::id() & opcode::REGISTER_MASK), len)?;
        raw_value.as_mut().copy_from_slice(&self.buffer[1..=len]);

        let value = raw_value.as_ref().first().copied().unwrap_or_default();
        let register = R::from_bytes(raw_value).map_err(|_| DeviceError::Decode {
            register: R::id(),
            value,
        })?;
        Ok((status, register))
    }

    /// Writes a value to a device register.
    ///
    /// Returns the status sampled while the write was clocked in.
    pub fn write_register<R>(&mut self, register: R) -> Result<Status, DeviceError<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        let len = raw_value.as_ref().len();
        self.buffer[1..=len].copy_from_slice(raw_value.as_ref());

        self.transfer(opcode::W_REGISTER | (R::id() & opcode::REGISTER_MASK), len)
    }

    /// Reads `bytes.len()` bytes from a register, in wire order.
    pub fn read_bytes(
        &mut self,
        register: u8,
        bytes: &mut [u8],
    ) -> Result<Status, DeviceError<SPI::Error>> {
        let len = bytes.len();
        if len > MAX_PAYLOAD {
            return Err(DeviceError::Length(len));
        }
        self.buffer[1..=len].fill(0);
        let status = self.transfer(opcode::R_REGISTER | (register & opcode::REGISTER_MASK), len)?;
        bytes.copy_from_slice(&self.buffer[1..=len]);
        Ok(status)
    }

    /// Writes bytes to a register, in wire order.
    pub fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<Status, DeviceError<SPI::Error>> {
        self.stage(bytes)?;
        self.transfer(opcode::W_REGISTER | (register & opcode::REGISTER_MASK), bytes.len())
    }

    /// Pops the RX FIFO head into `bytes`.
    ///
    /// The chip discards whatever part of the payload is not clocked out.
    pub fn read_payload(&mut self, bytes: &mut [u8]) -> Result<Status, DeviceError<SPI::Error>> {
        let len = bytes.len();
        if len > MAX_PAYLOAD {
            return Err(DeviceError::Length(len));
        }
        self.buffer[1..=len].fill(0);
        let status = self.transfer(opcode::R_RX_PAYLOAD, len)?;
        bytes.copy_from_slice(&self.buffer[1..=len]);
        Ok(status)
    }

    /// Pushes a payload to the TX FIFO using the given payload opcode.
    pub fn write_payload(&mut self, opcode: u8, bytes: &[u8]) -> Result<Status, DeviceError<SPI::Error>> {
        self.stage(bytes)?;
        self.transfer(opcode, bytes.len())
    }

    /// Executes a command on the device.
    ///
    /// # Returns
    /// The status byte and the command response parameters
    ///
    /// # Errors
    /// * `DeviceError::Bus` - SPI communication failed
    /// * `DeviceError::Decode` - Failed to parse command response
    pub fn execute_command<C>(
        &mut self,
        command: C,
    ) -> Result<(Status, C::ResponseParameters), DeviceError<SPI::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        let request = match command.invoking_parameters().to_bytes() {
            Ok(raw) => raw,
            Err(never) => match never {},
        };
        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();
        let request_len = request.as_ref().len();
        let response_len = raw_response.as_ref().len();

        if request_len + response_len > MAX_PAYLOAD {
            return Err(DeviceError::Length(request_len + response_len));
        }
        self.buffer[1..=request_len].copy_from_slice(request.as_ref());
        self.buffer[request_len + 1..=request_len + response_len].fill(0);

        let status = self.transfer(C::id(), request_len + response_len)?;
        raw_response
            .as_mut()
            .copy_from_slice(&self.buffer[request_len + 1..=request_len + response_len]);

        let value = raw_response.as_ref().first().copied().unwrap_or_default();
        let response = C::ResponseParameters::from_bytes(raw_response).map_err(|_| DeviceError::Decode {
            register: C::id(),
            value,
        })?;
        Ok((status, response))
    }

    fn stage(&mut self, bytes: &[u8]) -> Result<(), DeviceError<SPI::Error>> {
        if bytes.len() > MAX_PAYLOAD {
            return Err(DeviceError::Length(bytes.len()));
        }
        self.buffer[1..=bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}
