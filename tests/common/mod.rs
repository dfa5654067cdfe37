#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::io;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};
use nrf24_reactor::{Address, Nrf24, Selector};

/// Register file and FIFOs of a simulated nRF24L01+
#[derive(Debug)]
pub struct Chip {
    pub registers: [u8; 0x20],
    /// Multi-byte address registers in wire order, least significant byte first
    pub rx_addr_p0: [u8; 5],
    pub rx_addr_p1: [u8; 5],
    pub tx_addr: [u8; 5],
    /// Received packets with the pipe they arrived on
    pub rx_fifo: VecDeque<(usize, Vec<u8>)>,
    /// Queued packets with the opcode that wrote them
    pub tx_fifo: Vec<(u8, Vec<u8>)>,
    pub payload_reads: usize,
    pub reuse_tx: bool,
}

impl Default for Chip {
    fn default() -> Self {
        let mut registers = [0u8; 0x20];
        registers[0x00] = 0x08;
        registers[0x01] = 0x3F;
        registers[0x02] = 0x03;
        registers[0x03] = 0x03;
        registers[0x04] = 0x03;
        registers[0x05] = 0x02;
        registers[0x06] = 0x0E;
        registers[0x0C] = 0xC3;
        registers[0x0D] = 0xC4;
        registers[0x0E] = 0xC5;
        registers[0x0F] = 0xC6;
        Self {
            registers,
            rx_addr_p0: [0xE7; 5],
            rx_addr_p1: [0xC2; 5],
            tx_addr: [0xE7; 5],
            rx_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            payload_reads: 0,
            reuse_tx: false,
        }
    }
}

impl Chip {
    pub fn status(&self) -> u8 {
        let pipe = self.rx_fifo.front().map_or(0x07, |(pipe, _)| *pipe as u8);
        let tx_full = self.tx_fifo.len() >= 3;
        (self.registers[0x07] & 0x70) | (pipe << 1) | tx_full as u8
    }

    fn fifo_status(&self) -> u8 {
        ((self.reuse_tx as u8) << 6)
            | (((self.tx_fifo.len() >= 3) as u8) << 5)
            | ((self.tx_fifo.is_empty() as u8) << 4)
            | (((self.rx_fifo.len() >= 3) as u8) << 1)
            | self.rx_fifo.is_empty() as u8
    }

    /// Queues a received packet and raises RX_DR
    pub fn inject_packet(&mut self, pipe: usize, data: &[u8]) {
        self.rx_fifo.push_back((pipe, data.to_vec()));
        self.registers[0x07] |= 0x40;
    }

    /// Raises interrupt bits (RX_DR 0x40, TX_DS 0x20, MAX_RT 0x10)
    pub fn raise(&mut self, bits: u8) {
        self.registers[0x07] |= bits & 0x70;
    }

    pub fn pending_interrupts(&self) -> u8 {
        self.registers[0x07] & 0x70
    }

    fn address_register(&mut self, register: u8) -> Option<&mut [u8; 5]> {
        match register {
            0x0A => Some(&mut self.rx_addr_p0),
            0x0B => Some(&mut self.rx_addr_p1),
            0x10 => Some(&mut self.tx_addr),
            _ => None,
        }
    }

    fn read_register(&mut self, register: u8, data: &mut [u8]) {
        if let Some(address) = self.address_register(register) {
            let len = data.len().min(5);
            data[..len].copy_from_slice(&address[..len]);
            return;
        }
        if let Some(byte) = data.first_mut() {
            *byte = match register {
                0x17 => self.fifo_status(),
                0x07 => self.status(),
                _ => self.registers[register as usize],
            };
        }
    }

    fn write_register(&mut self, register: u8, data: &[u8]) {
        if let Some(address) = self.address_register(register) {
            let len = data.len().min(5);
            address[..len].copy_from_slice(&data[..len]);
            return;
        }
        let Some(&byte) = data.first() else { return };
        match register {
            // write one to clear
            0x07 => self.registers[0x07] &= !(byte & 0x70),
            _ => self.registers[register as usize] = byte,
        }
    }

    fn exchange(&mut self, buffer: &mut [u8]) {
        let opcode = buffer[0];
        buffer[0] = self.status();
        let data = &mut buffer[1..];
        match opcode {
            0x00..=0x1F => self.read_register(opcode & 0x1F, data),
            0x20..=0x3F => self.write_register(opcode & 0x1F, data),
            0x61 => {
                self.payload_reads += 1;
                let packet = self.rx_fifo.pop_front().map(|(_, packet)| packet).unwrap_or_default();
                for (dst, src) in data.iter_mut().zip(packet.iter().chain(std::iter::repeat(&0))) {
                    *dst = *src;
                }
            }
            0xA0 | 0xB0 => self.tx_fifo.push((opcode, data.to_vec())),
            0xE1 => self.tx_fifo.clear(),
            0xE2 => self.rx_fifo.clear(),
            0xE3 => self.reuse_tx = true,
            0x60 => data[0] = self.rx_fifo.front().map_or(0, |(_, packet)| packet.len() as u8),
            0xFF => {}
            other => panic!("unsupported opcode {other:#04x}"),
        }
    }
}

/// SPI device backed by a shared [`Chip`]
#[derive(Clone, Default)]
pub struct SimSpi {
    chip: Arc<Mutex<Chip>>,
}

impl SimSpi {
    pub fn chip(&self) -> MutexGuard<'_, Chip> {
        self.chip.lock().unwrap()
    }
}

impl spi::ErrorType for SimSpi {
    type Error = Infallible;
}

impl SpiDevice for SimSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut chip = self.chip.lock().unwrap();
        for operation in operations {
            match operation {
                Operation::TransferInPlace(buffer) => chip.exchange(buffer),
                _ => panic!("the driver only issues in-place transfers"),
            }
        }
        Ok(())
    }
}

/// Output pin recording every level it is driven to
#[derive(Clone, Default)]
pub struct FakePin {
    history: Arc<Mutex<Vec<bool>>>,
}

impl FakePin {
    pub fn history(&self) -> Vec<bool> {
        self.history.lock().unwrap().clone()
    }

    pub fn level(&self) -> Option<bool> {
        self.history.lock().unwrap().last().copied()
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.history.lock().unwrap().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.history.lock().unwrap().push(true);
        Ok(())
    }
}

pub type SimRadio = Nrf24<SimSpi, FakePin>;

/// Radio on a fresh simulated chip, with handles to the chip and CE pin
pub fn radio() -> (SimRadio, SimSpi, FakePin) {
    let spi = SimSpi::default();
    let ce = FakePin::default();
    let radio = Nrf24::new(spi.clone(), ce.clone()).unwrap();
    (radio, spi, ce)
}

pub fn addr(text: &str) -> Address {
    Address::try_from(text).unwrap()
}

/// Selector driven by the test: every registration raises one wake for the
/// new handle, like an edge-triggered epoll registration on a GPIO file
#[derive(Clone, Default)]
pub struct ScriptedSelector {
    pending: Arc<Mutex<Vec<RawFd>>>,
    registered: Arc<Mutex<Vec<RawFd>>>,
    fail_wait: Arc<AtomicBool>,
}

impl ScriptedSelector {
    /// Reports an edge on `handle` at the next wait
    pub fn fire(&self, handle: RawFd) {
        self.pending.lock().unwrap().push(handle);
    }

    pub fn registered(&self) -> Vec<RawFd> {
        self.registered.lock().unwrap().clone()
    }

    /// Makes the next wait fail without consuming pending wakes
    pub fn fail_next_wait(&self) {
        self.fail_wait.store(true, Ordering::SeqCst);
    }
}

impl Selector for ScriptedSelector {
    fn register(&mut self, handle: RawFd) -> io::Result<()> {
        self.registered.lock().unwrap().push(handle);
        self.pending.lock().unwrap().push(handle);
        Ok(())
    }

    fn wait(&mut self, ready: &mut Vec<RawFd>, timeout: Duration) -> io::Result<()> {
        if self.fail_wait.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "scripted wait failure"));
        }
        let fired: Vec<RawFd> = self.pending.lock().unwrap().drain(..).collect();
        if fired.is_empty() {
            thread::sleep(timeout);
        }
        ready.extend(fired);
        Ok(())
    }
}

/// Polls `condition` until it holds or a second has passed
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
