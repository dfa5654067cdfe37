//! nRF24L01+ Radio Driver
//!
//! This crate drives the Nordic nRF24L01+ 2.4 GHz transceiver from a Linux
//! single-board computer and services its interrupts from a small
//! event-multiplexing reactor.
//!
//! # Features
//! - 126 RF channels (0 to 83 accepted by the driver), 1 or 2 Mbps
//! - Six receive pipes with 3 to 5 byte addresses
//! - Static or dynamic payloads of up to 32 bytes
//! - Automatic acknowledgement and retransmission
//! - Interrupts through an edge-triggered IRQ line or by polling STATUS
//!
//! # Architecture
//! The crate is organized into several modules:
//!
//! - [`registers`]: Register definitions as immutable value types
//! - [`commands`]: Fixed-size SPI commands and the opcode table
//! - [`device`]: Raw protocol layer, one full-duplex SPI transfer per command
//! - [`radio`]: The [`Nrf24`] driver
//!   - Typed register accessors with range checks
//!   - Mode-guarded listen, transmit and receive
//!   - Configuration validation
//!   - Ordered interrupt dispatch
//! - [`receiver`]: Per-pipe consumer draining bursts of packets
//! - [`reactor`]: Background loop over polled conditions and edge-triggered handles
//!
//! # Usage
//! Configuration follows a specific sequence:
//!
//! 1. Create the [`Nrf24`] with an SPI device and the chip-enable pin
//! 2. Configure channel, rates, addresses and payload lengths
//! 3. Write [`Config`] with the receive or transmit mode
//! 4. [`validate`](Nrf24::validate) the configuration
//! 5. Attach the driver to a [`Reactor`] and start it
//! 6. [`listen`](Nrf24::listen) or [`transmit_packet`](Nrf24::transmit_packet)
//!
//! # Important Notes
//! - Register writes only take effect while chip-enable is low
//! - Pipes 2 to 5 share all but the last address byte with pipe 1
//! - Reactor callbacks run on the reactor thread and must not block
//!
//! # Example
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use embedded_hal::{digital::OutputPin, spi::SpiDevice};
//! use nrf24_reactor::{
//!     Address, Config, IrqLine, Mode, Nrf24, PipeReceiver, Reactor, ReactorConfig,
//! };
//!
//! fn receive<SPI, CE>(spi: SPI, ce: CE) -> Result<(), Box<dyn std::error::Error>>
//! where
//!     SPI: SpiDevice + Send + 'static,
//!     CE: OutputPin + Send + 'static,
//!     SPI::Error: Send + Sync + 'static,
//!     CE::Error: Send + Sync + 'static,
//! {
//!     let mut radio = Nrf24::new(spi, ce)?;
//!     radio.set_rf_channel(76)?;
//!     PipeReceiver::new(1, Address::try_from("nrf01")?, 32)?
//!         .subscribe(&mut radio, |packet| println!("{packet:02x?}"))?;
//!     radio.set_config(Config::default().with_mode(Mode::Receive))?;
//!     radio.validate()?;
//!
//!     let radio = Arc::new(Mutex::new(radio));
//!     let mut reactor = Reactor::new(ReactorConfig::default());
//!     Nrf24::attach(&radio, &reactor, IrqLine::Polled)?;
//!     reactor.start()?;
//!     radio.lock().map_err(|_| "poisoned")?.listen()?;
//!     reactor.join()?;
//!     Ok(())
//! }
//! ```

use regiface::{Command, NoParameters};

pub mod address;
pub mod commands;
pub mod device;
pub mod error;
pub mod interrupts;
pub mod radio;
pub mod reactor;
pub mod receiver;
pub mod registers;

pub use address::Address;
pub use commands::*;
pub use device::{Device, DeviceError, MAX_PAYLOAD};
pub use error::*;
pub use interrupts::InterruptKind;
pub use radio::*;
pub use reactor::*;
pub use receiver::PipeReceiver;
pub use registers::*;
