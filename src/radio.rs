//! nRF24L01+ driver
//!
//! [`Nrf24`] wraps the protocol layer with typed register accessors, the
//! mode-guarded operations (listen, transmit, receive), configuration
//! validation and interrupt dispatch.
//!
//! The mode is cached from the last [`Nrf24::set_config`], so guards cost
//! no bus traffic. Every parameter is range-checked before anything is
//! sent; bus and pin errors are returned unmodified and never retried.
//!
//! The driver holds no lock. To service interrupts from a [`Reactor`] it
//! must be shared as `Arc<Mutex<Nrf24>>` and attached with
//! [`Nrf24::attach`]; handlers then run on the reactor thread with the
//! driver already locked.

use core::convert::Infallible;
use core::fmt;
use core::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiDevice};
use log::{debug, trace, warn};
use regiface::{ReadableRegister, WritableRegister};

use crate::address::Address;
use crate::device::{Device, MAX_PAYLOAD};
use crate::error::{AddressTarget, CallbackError, Error, RangeError, ReactorError, StateError};
use crate::interrupts::{Handlers, InterruptKind};
use crate::reactor::{Handle, Reactor};
use crate::registers::address::{RX_ADDR_P0, RX_PW_P0, TX_ADDR};
use crate::registers::*;
use crate::{opcode, FlushRx, FlushTx, Nop, PayloadWidth, ReadRxPayloadWidth, ReuseTx};

/// Driver error for a given SPI device and chip-enable pin
pub type DriverError<SPI, CE> =
    Error<<SPI as spi::ErrorType>::Error, <CE as digital::ErrorType>::Error>;

/// How the IRQ line reaches the reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqLine {
    /// No IRQ line is wired; STATUS is polled on every reactor iteration
    Polled,
    /// Falling edges of the IRQ line are reported on this handle
    Edge(Handle),
}

/// nRF24L01+ transceiver
pub struct Nrf24<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    device: Device<SPI>,
    ce: CE,
    config: Config,
    features: Feature,
    /// Length of the last address written to pipes 0 and 1
    rx_address_len: [usize; 2],
    tx_address_len: usize,
    handlers: Handlers<Nrf24<SPI, CE>, DriverError<SPI, CE>>,
}

fn check_pipe(pipe: usize) -> Result<(), RangeError> {
    if pipe < PIPE_COUNT {
        Ok(())
    } else {
        Err(RangeError::Pipe(pipe))
    }
}

fn default_address(pipe: usize) -> Result<Address, RangeError> {
    Address::new(&[b'n', b'r', b'f', b'0', b'0' + pipe as u8])
}

impl<SPI, CE> Nrf24<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    /// Takes ownership of the bus and chip-enable pin and writes the
    /// power-on configuration: powered down, one byte CRC, every interrupt
    /// enabled, auto-ack on all pipes, pipes 0 and 1 enabled, 5 byte
    /// addresses `nrf00` to `nrf05`, channel 2 at 2 Mbps and 0 dBm, three
    /// retries 250µs apart, fixed payload lengths of 0 and no features.
    /// Pending interrupts are cleared and both FIFOs flushed.
    pub fn new(spi: SPI, ce: CE) -> Result<Self, DriverError<SPI, CE>> {
        let mut radio = Self {
            device: Device::new(spi),
            ce,
            config: Config::default(),
            features: Feature::default(),
            rx_address_len: [Address::MAX_LEN; 2],
            tx_address_len: Address::MAX_LEN,
            handlers: Handlers::default(),
        };

        radio.ce.set_low().map_err(Error::Pin)?;
        radio.set_config(Config::default())?;
        radio.set_auto_ack(AutoAck::default().pipes)?;
        radio.set_rx_enabled(RxEnabled::default().pipes)?;
        radio.set_address_width(AddressWidth::default().width())?;
        radio.set_auto_retry(AutoRetry::default())?;
        radio.set_rf_channel(RfChannel::default().channel)?;
        radio.set_rf_config(RfConfig::default())?;
        radio.set_features(Feature::default())?;
        radio.set_dyn_payload(DynPayload::default().pipes)?;
        for pipe in 0..PIPE_COUNT {
            radio.set_rx_address(pipe, default_address(pipe)?)?;
            radio.write_rx_length(pipe, 0)?;
        }
        radio.set_tx_address(default_address(0)?)?;
        radio.clear_interrupts(Interrupt::all())?;
        radio.flush_transmit()?;
        radio.flush_receive()?;

        debug!("nRF24 configured with power-on defaults");
        Ok(radio)
    }

    /// Releases the SPI device and chip-enable pin.
    pub fn release(self) -> (SPI, CE) {
        (self.device.release(), self.ce)
    }

    fn read<R>(&mut self) -> Result<R, DriverError<SPI, CE>>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let (_, register) = self.device.read_register()?;
        Ok(register)
    }

    fn write<R>(&mut self, register: R) -> Result<Status, DriverError<SPI, CE>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        Ok(self.device.write_register(register)?)
    }

    fn require_mode(&self, expected: Mode) -> Result<(), DriverError<SPI, CE>> {
        let actual = self.config.mode();
        if actual != expected {
            return Err(StateError::WrongMode { expected, actual }.into());
        }
        Ok(())
    }

    /// Configuration as last written
    pub fn config(&self) -> Config {
        self.config
    }

    /// Writes CONFIG. This is the only way to change the mode.
    pub fn set_config(&mut self, config: Config) -> Result<(), DriverError<SPI, CE>> {
        self.write(config)?;
        self.config = config;
        Ok(())
    }

    /// Pipes with auto-acknowledgement enabled (EN_AA)
    pub fn auto_ack(&mut self) -> Result<PipeFlags, DriverError<SPI, CE>> {
        Ok(self.read::<AutoAck>()?.pipes)
    }

    /// Writes EN_AA
    pub fn set_auto_ack(&mut self, pipes: PipeFlags) -> Result<(), DriverError<SPI, CE>> {
        self.write(AutoAck::from(pipes))?;
        Ok(())
    }

    /// Pipes enabled for reception (EN_RXADDR)
    pub fn rx_enabled(&mut self) -> Result<PipeFlags, DriverError<SPI, CE>> {
        Ok(self.read::<RxEnabled>()?.pipes)
    }

    /// Writes EN_RXADDR
    pub fn set_rx_enabled(&mut self, pipes: PipeFlags) -> Result<(), DriverError<SPI, CE>> {
        self.write(RxEnabled::from(pipes))?;
        Ok(())
    }

    /// Address width in bytes
    pub fn address_width(&mut self) -> Result<usize, DriverError<SPI, CE>> {
        Ok(self.read::<AddressWidth>()?.width())
    }

    /// Sets the address width to 3, 4 or 5 bytes
    pub fn set_address_width(&mut self, width: usize) -> Result<(), DriverError<SPI, CE>> {
        let register = AddressWidth::new(width).map_err(|_| RangeError::AddressWidth(width))?;
        self.write(register)?;
        Ok(())
    }

    /// Reads SETUP_RETR
    pub fn auto_retry(&mut self) -> Result<AutoRetry, DriverError<SPI, CE>> {
        self.read()
    }

    /// Sets automatic retransmission. The delay must be a multiple of
    /// 250µs from 250µs to 4000µs and the count at most 15.
    pub fn set_auto_retry(&mut self, retry: AutoRetry) -> Result<(), DriverError<SPI, CE>> {
        let delay = retry.delay_us();
        if !(AutoRetry::DELAY_STEP_US..=AutoRetry::MAX_DELAY_US).contains(&delay)
            || delay % AutoRetry::DELAY_STEP_US != 0
        {
            return Err(RangeError::RetryDelay(delay).into());
        }
        if retry.count() > AutoRetry::MAX_COUNT {
            return Err(RangeError::RetryCount(retry.count()).into());
        }
        self.write(retry)?;
        Ok(())
    }

    /// Current RF channel
    pub fn rf_channel(&mut self) -> Result<u8, DriverError<SPI, CE>> {
        Ok(self.read::<RfChannel>()?.channel)
    }

    /// Tunes to `2400 + channel` MHz, channel 0 to 83
    pub fn set_rf_channel(&mut self, channel: u8) -> Result<(), DriverError<SPI, CE>> {
        if channel > RfChannel::MAX {
            return Err(RangeError::Channel(channel).into());
        }
        self.write(RfChannel { channel })?;
        Ok(())
    }

    /// Reads RF_SETUP
    pub fn rf_config(&mut self) -> Result<RfConfig, DriverError<SPI, CE>> {
        self.read()
    }

    /// Writes RF_SETUP
    pub fn set_rf_config(&mut self, rf_config: RfConfig) -> Result<(), DriverError<SPI, CE>> {
        self.write(rf_config)?;
        Ok(())
    }

    /// Pipes with dynamic payload length enabled (DYNPD)
    pub fn dyn_payload(&mut self) -> Result<PipeFlags, DriverError<SPI, CE>> {
        Ok(self.read::<DynPayload>()?.pipes)
    }

    /// Writes DYNPD
    pub fn set_dyn_payload(&mut self, pipes: PipeFlags) -> Result<(), DriverError<SPI, CE>> {
        self.write(DynPayload::from(pipes))?;
        Ok(())
    }

    /// Features as last written
    pub fn features(&self) -> Feature {
        self.features
    }

    /// Writes FEATURE and caches it for the mode guards
    pub fn set_features(&mut self, features: Feature) -> Result<(), DriverError<SPI, CE>> {
        self.write(features)?;
        self.features = features;
        Ok(())
    }

    /// Samples STATUS with a NOP
    pub fn status(&mut self) -> Result<Status, DriverError<SPI, CE>> {
        let (status, _) = self.device.execute_command(Nop)?;
        Ok(status)
    }

    /// Lost and retransmitted packet counters (OBSERVE_TX)
    pub fn tx_stats(&mut self) -> Result<TxStats, DriverError<SPI, CE>> {
        self.read()
    }

    /// Whether a carrier above -64 dBm was present during the last receive
    pub fn carrier_detect(&mut self) -> Result<bool, DriverError<SPI, CE>> {
        Ok(self.read::<CarrierDetect>()?.detected)
    }

    /// Reads FIFO_STATUS
    pub fn fifo_status(&mut self) -> Result<FifoStatus, DriverError<SPI, CE>> {
        self.read()
    }

    /// Reads the address of `pipe`, `address width` bytes long.
    ///
    /// Pipes 2 to 5 report pipe 1's address with their own least
    /// significant byte.
    pub fn rx_address(&mut self, pipe: usize) -> Result<Address, DriverError<SPI, CE>> {
        check_pipe(pipe)?;
        let base = pipe.min(1);
        let address = self.read_address(RX_ADDR_P0 + base as u8)?;
        if pipe == base {
            return Ok(address);
        }

        let mut lsb = [0u8];
        self.device.read_bytes(RX_ADDR_P0 + pipe as u8, &mut lsb)?;
        Ok(address.with_lsb(lsb[0]))
    }

    /// Sets the address of `pipe`.
    ///
    /// Pipes 0 and 1 take the full address. Pipes 2 to 5 only store its
    /// least significant byte; the rest is shared with pipe 1.
    pub fn set_rx_address(&mut self, pipe: usize, address: Address) -> Result<(), DriverError<SPI, CE>> {
        check_pipe(pipe)?;
        let register = RX_ADDR_P0 + pipe as u8;
        if pipe < 2 {
            self.write_address(register, &address)?;
            self.rx_address_len[pipe] = address.len();
        } else {
            self.device.write_bytes(register, &[address.lsb()])?;
        }
        Ok(())
    }

    /// Reads TX_ADDR at the configured width
    pub fn tx_address(&mut self) -> Result<Address, DriverError<SPI, CE>> {
        self.read_address(TX_ADDR)
    }

    /// Writes TX_ADDR, least significant byte first on the wire
    pub fn set_tx_address(&mut self, address: Address) -> Result<(), DriverError<SPI, CE>> {
        self.write_address(TX_ADDR, &address)?;
        self.tx_address_len = address.len();
        Ok(())
    }

    fn read_address(&mut self, register: u8) -> Result<Address, DriverError<SPI, CE>> {
        let width = self.address_width()?;
        let mut wire = [0u8; Address::MAX_LEN];
        self.device.read_bytes(register, &mut wire[..width])?;
        Ok(Address::from_wire(&wire[..width])?)
    }

    fn write_address(&mut self, register: u8, address: &Address) -> Result<(), DriverError<SPI, CE>> {
        let mut wire = [0u8; Address::MAX_LEN];
        let len = address.to_wire(&mut wire);
        self.device.write_bytes(register, &wire[..len])?;
        Ok(())
    }

    /// Static payload length of `pipe`, 0 when the pipe uses dynamic payloads
    pub fn rx_length(&mut self, pipe: usize) -> Result<usize, DriverError<SPI, CE>> {
        check_pipe(pipe)?;
        let mut len = [0u8];
        self.device.read_bytes(RX_PW_P0 + pipe as u8, &mut len)?;
        Ok((len[0] & 0x3F) as usize)
    }

    /// Sets the payload length of `pipe`, at most 32 bytes.
    ///
    /// A length of 0 selects dynamic payloads and requires both the
    /// dynamic payload feature and the pipe's [`DynPayload`] flag.
    pub fn set_rx_length(&mut self, pipe: usize, len: usize) -> Result<(), DriverError<SPI, CE>> {
        check_pipe(pipe)?;
        if len > MAX_PAYLOAD {
            return Err(RangeError::PayloadLength(len).into());
        }
        if len == 0 && !(self.features.dyn_payload() && self.dyn_payload()?.pipe(pipe)) {
            return Err(StateError::DynamicPayloadDisabled { pipe }.into());
        }
        self.write_rx_length(pipe, len)
    }

    fn write_rx_length(&mut self, pipe: usize, len: usize) -> Result<(), DriverError<SPI, CE>> {
        self.device.write_bytes(RX_PW_P0 + pipe as u8, &[len as u8])?;
        Ok(())
    }

    /// Width of the payload at the RX FIFO head when dynamic payloads are
    /// active.
    ///
    /// A width above 32 marks a corrupt packet: the RX FIFO is flushed and
    /// an error returned.
    pub fn rx_dynamic_length(&mut self) -> Result<usize, DriverError<SPI, CE>> {
        if !self.features.dyn_payload() {
            return Err(StateError::DynamicPayloadInactive.into());
        }
        let (_, PayloadWidth { width }) = self.device.execute_command(ReadRxPayloadWidth)?;
        let width = width as usize;
        if width > MAX_PAYLOAD {
            warn!("discarding corrupt dynamic payload of {width} bytes");
            self.flush_receive()?;
            return Err(RangeError::PayloadLength(width).into());
        }
        Ok(width)
    }

    /// Raises chip-enable, starting reception. Requires receive mode.
    pub fn listen(&mut self) -> Result<(), DriverError<SPI, CE>> {
        self.require_mode(Mode::Receive)?;
        self.ce.set_high().map_err(Error::Pin)
    }

    /// Lowers chip-enable, stopping reception. Requires receive mode.
    pub fn unlisten(&mut self) -> Result<(), DriverError<SPI, CE>> {
        self.require_mode(Mode::Receive)?;
        self.ce.set_low().map_err(Error::Pin)
    }

    /// Queues `data` and pulses chip-enable to send it. Requires transmit
    /// mode.
    ///
    /// The packet is queued without an acknowledgement request when the
    /// disable-ack feature is set.
    pub fn transmit_packet(&mut self, data: &[u8]) -> Result<Status, DriverError<SPI, CE>> {
        self.require_mode(Mode::Transmit)?;
        if data.len() > MAX_PAYLOAD {
            return Err(RangeError::PayloadLength(data.len()).into());
        }
        let command = if self.features.disable_ack() {
            opcode::W_TX_PAYLOAD_NO_ACK
        } else {
            opcode::W_TX_PAYLOAD
        };
        let status = self.device.write_payload(command, data)?;
        self.ce.set_high().map_err(Error::Pin)?;
        self.ce.set_low().map_err(Error::Pin)?;
        Ok(status)
    }

    /// Pops the RX FIFO head into the first `len` bytes of `buffer`.
    /// Requires receive mode.
    pub fn receive_packet(&mut self, buffer: &mut [u8], len: usize) -> Result<Status, DriverError<SPI, CE>> {
        self.require_mode(Mode::Receive)?;
        if len > buffer.len() || len > MAX_PAYLOAD {
            return Err(RangeError::PayloadLength(len).into());
        }
        Ok(self.device.read_payload(&mut buffer[..len])?)
    }

    /// Reads one packet sized by the payload length of `pipe`, or by the
    /// dynamic payload width when that length is 0
    pub fn receive_pipe_packet(&mut self, pipe: usize) -> Result<Vec<u8>, DriverError<SPI, CE>> {
        let len = match self.rx_length(pipe)? {
            0 => self.rx_dynamic_length()?,
            len => len,
        };
        let mut packet = vec![0u8; len];
        self.receive_packet(&mut packet, len)?;
        Ok(packet)
    }

    /// Discards every packet in the TX FIFO
    pub fn flush_transmit(&mut self) -> Result<Status, DriverError<SPI, CE>> {
        let (status, _) = self.device.execute_command(FlushTx)?;
        Ok(status)
    }

    /// Discards every packet in the RX FIFO
    pub fn flush_receive(&mut self) -> Result<Status, DriverError<SPI, CE>> {
        let (status, _) = self.device.execute_command(FlushRx)?;
        Ok(status)
    }

    /// Keeps resending the last transmitted payload on each chip-enable pulse
    pub fn reuse_transmit(&mut self) -> Result<Status, DriverError<SPI, CE>> {
        let (status, _) = self.device.execute_command(ReuseTx)?;
        Ok(status)
    }

    /// Clears the interrupts in `mask` and returns STATUS as it was
    /// before the clear.
    pub fn clear_interrupts(&mut self, mask: Interrupt) -> Result<Status, DriverError<SPI, CE>> {
        self.write(InterruptClear { mask })
    }

    /// Checks that the configuration is consistent for the current mode.
    ///
    /// In transmit mode the TX address must match the address width, and
    /// auto-ack must be off on pipe 0 when the disable-ack feature is set.
    /// In receive mode the addresses of enabled pipes 0 and 1 must match
    /// the address width, and no two enabled pipes may share an address
    /// least significant byte.
    pub fn validate(&mut self) -> Result<(), DriverError<SPI, CE>> {
        let result = self.check_consistency();
        if let Err(error) = &result {
            warn!("configuration rejected: {error}");
        }
        result
    }

    fn check_consistency(&mut self) -> Result<(), DriverError<SPI, CE>> {
        let width = self.address_width()?;
        match self.config.mode() {
            Mode::Transmit => {
                if self.tx_address_len != width {
                    return Err(StateError::AddressWidthMismatch {
                        target: AddressTarget::Tx,
                        length: self.tx_address_len,
                        width,
                    }
                    .into());
                }
                if self.features.disable_ack() && self.auto_ack()?.pipe(0) {
                    return Err(StateError::AutoAckWithAckDisabled.into());
                }
                Ok(())
            }
            Mode::Receive => {
                let enabled = self.rx_enabled()?;
                for pipe in 0..2 {
                    let length = self.rx_address_len[pipe];
                    if enabled.pipe(pipe) && length != width {
                        return Err(StateError::AddressWidthMismatch {
                            target: AddressTarget::Rx(pipe),
                            length,
                            width,
                        }
                        .into());
                    }
                }

                let mut lsbs = [None; PIPE_COUNT];
                for pipe in enabled.pipes() {
                    lsbs[pipe] = Some(self.rx_address(pipe)?.lsb());
                }
                for first in 0..PIPE_COUNT {
                    for second in first + 1..PIPE_COUNT {
                        if let (Some(lsb), Some(other)) = (lsbs[first], lsbs[second]) {
                            if lsb == other {
                                return Err(StateError::DuplicateAddressLsb { first, second, lsb }.into());
                            }
                        }
                    }
                }
                Ok(())
            }
            Mode::Off => Err(StateError::InvalidMode.into()),
        }
    }

    /// Subscribes `handler` to an interrupt kind.
    ///
    /// Handlers run from [`Nrf24::handle_interrupt`] with the driver and the
    /// STATUS sampled while clearing. A failing handler stops the dispatch.
    pub fn on_interrupt<F>(&mut self, kind: InterruptKind, handler: F)
    where
        F: FnMut(&mut Self, Status) -> Result<(), DriverError<SPI, CE>> + Send + 'static,
    {
        self.handlers.subscribe(kind, Box::new(handler));
    }

    /// Clears every pending interrupt and runs the subscribed handlers:
    /// any-interrupt handlers first, then receive ready, transmit sent and
    /// retry failed for the bits that were set.
    ///
    /// Handlers subscribed while dispatching take part from the next
    /// interrupt on.
    pub fn handle_interrupt(&mut self) -> Result<Status, DriverError<SPI, CE>> {
        let status = self.clear_interrupts(Interrupt::all())?;
        trace!("interrupt, status {:#04x}", status.to_byte());

        let mut handlers = mem::take(&mut self.handlers);
        let result = handlers.dispatch(self, status);
        let mut subscribed = mem::replace(&mut self.handlers, handlers);
        self.handlers.append(&mut subscribed);

        result.map(|()| status)
    }

    /// Reads every register
    pub fn snapshot(&mut self) -> Result<RegisterSnapshot, DriverError<SPI, CE>> {
        let tx_address = self.tx_address()?;
        let mut rx_addresses = [tx_address; PIPE_COUNT];
        let mut rx_lengths = [0; PIPE_COUNT];
        for pipe in 0..PIPE_COUNT {
            rx_addresses[pipe] = self.rx_address(pipe)?;
            rx_lengths[pipe] = self.rx_length(pipe)?;
        }

        Ok(RegisterSnapshot {
            config: self.read()?,
            auto_ack: self.auto_ack()?,
            rx_enabled: self.rx_enabled()?,
            address_width: self.address_width()?,
            auto_retry: self.auto_retry()?,
            rf_channel: self.rf_channel()?,
            rf_config: self.rf_config()?,
            status: self.status()?,
            tx_stats: self.tx_stats()?,
            carrier_detect: self.carrier_detect()?,
            rx_addresses,
            tx_address,
            rx_lengths,
            fifo_status: self.fifo_status()?,
            dyn_payload: self.dyn_payload()?,
            features: self.read()?,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CallbackError> {
    mutex
        .lock()
        .map_err(|_| CallbackError::from("radio lock poisoned"))
}

impl<SPI, CE> Nrf24<SPI, CE>
where
    SPI: SpiDevice + Send + 'static,
    CE: OutputPin + Send + 'static,
    SPI::Error: Send + Sync + 'static,
    CE::Error: Send + Sync + 'static,
{
    /// Services the radio's interrupts from `reactor`.
    ///
    /// With [`IrqLine::Edge`] the handler runs on every edge of the IRQ
    /// line. With [`IrqLine::Polled`] STATUS is sampled on every iteration
    /// and the handler runs while any interrupt is pending. Handler errors
    /// terminate the reactor loop.
    pub fn attach(radio: &Arc<Mutex<Self>>, reactor: &Reactor, irq: IrqLine) -> Result<(), ReactorError> {
        let handled = Arc::clone(radio);
        let callback = move || -> Result<(), CallbackError> {
            lock(&handled)?.handle_interrupt()?;
            Ok(())
        };

        match irq {
            IrqLine::Polled => {
                let polled = Arc::clone(radio);
                let predicate = move || -> Result<bool, CallbackError> {
                    Ok(!lock(&polled)?.status()?.interrupts().is_empty())
                };
                reactor.poll(predicate, callback)
            }
            IrqLine::Edge(handle) => reactor.select(handle, callback),
        }
    }
}

/// Every register of the transceiver, as read by [`Nrf24::snapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub config: Config,
    pub auto_ack: PipeFlags,
    pub rx_enabled: PipeFlags,
    pub address_width: usize,
    pub auto_retry: AutoRetry,
    pub rf_channel: u8,
    pub rf_config: RfConfig,
    pub status: Status,
    pub tx_stats: TxStats,
    pub carrier_detect: bool,
    pub rx_addresses: [Address; PIPE_COUNT],
    pub tx_address: Address,
    pub rx_lengths: [usize; PIPE_COUNT],
    pub fifo_status: FifoStatus,
    pub dyn_payload: PipeFlags,
    pub features: Feature,
}

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "config         mode {}, crc {:?}, interrupts {:?}",
            self.config.mode(),
            self.config.crc(),
            self.config.interrupts()
        )?;
        writeln!(f, "auto ack       {:?}", self.auto_ack)?;
        writeln!(f, "rx enabled     {:?}", self.rx_enabled)?;
        writeln!(f, "address width  {}", self.address_width)?;
        writeln!(
            f,
            "auto retry     {}us x {}{}",
            self.auto_retry.delay_us(),
            self.auto_retry.count(),
            if self.auto_retry.disabled() { " (disabled)" } else { "" }
        )?;
        writeln!(f, "rf channel     {}", self.rf_channel)?;
        writeln!(
            f,
            "rf config      {:?}, {:?}, lna gain {}",
            self.rf_config.bit_rate(),
            self.rf_config.power(),
            self.rf_config.lna_gain()
        )?;
        writeln!(f, "status         {:?}", self.status)?;
        writeln!(
            f,
            "tx stats       lost {}, retransmits {}",
            self.tx_stats.lost_packets, self.tx_stats.retransmits
        )?;
        writeln!(f, "carrier detect {}", self.carrier_detect)?;
        for (pipe, (address, len)) in self.rx_addresses.iter().zip(self.rx_lengths).enumerate() {
            writeln!(f, "rx pipe {pipe}      {address}, length {len}")?;
        }
        writeln!(f, "tx address     {}", self.tx_address)?;
        writeln!(f, "fifo status    {:?}", self.fifo_status)?;
        writeln!(f, "dyn payload    {:?}", self.dyn_payload)?;
        write!(f, "features       {:?}", self.features)
    }
}
