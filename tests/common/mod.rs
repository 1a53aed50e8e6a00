//! In-memory SX1231 model for driving the link layer without hardware.
//!
//! The model keeps a plain register file plus the parts of the packet engine
//! the link layer depends on: the FIFO, PayloadReady, PacketSent, ModeReady,
//! RX restart, the hardware address filter and the DIO0 mapping. Entering
//! Transmit "sends" the FIFO content, which tests then deliver to another
//! node's model.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use embedded_hal::digital::{ErrorType, InputPin};
use rfm69::{Clock, Error, FrequencyBand, Radio, RegisterPort};

pub const REG_FIFO: u8 = 0x00;
pub const REG_OPMODE: u8 = 0x01;
pub const REG_FRF_MSB: u8 = 0x07;
pub const REG_PALEVEL: u8 = 0x11;
pub const REG_OCP: u8 = 0x13;
pub const REG_RSSICONFIG: u8 = 0x23;
pub const REG_RSSIVALUE: u8 = 0x24;
pub const REG_DIOMAPPING1: u8 = 0x25;
pub const REG_IRQFLAGS1: u8 = 0x27;
pub const REG_IRQFLAGS2: u8 = 0x28;
pub const REG_SYNCVALUE1: u8 = 0x2F;
pub const REG_SYNCVALUE2: u8 = 0x30;
pub const REG_PACKETCONFIG1: u8 = 0x37;
pub const REG_NODEADRS: u8 = 0x39;
pub const REG_BROADCASTADRS: u8 = 0x3A;
pub const REG_PACKETCONFIG2: u8 = 0x3D;
pub const REG_AESKEY1: u8 = 0x3E;
pub const REG_TESTPA1: u8 = 0x5A;
pub const REG_TESTPA2: u8 = 0x5C;

pub const MODE_SLEEP: u8 = 0b000;
pub const MODE_STANDBY: u8 = 0b001;
pub const MODE_TX: u8 = 0b011;
pub const MODE_RX: u8 = 0b100;

/// Raw RssiValue for -114 dBm, well below the CSMA limit
pub const QUIET_RSSI: u8 = 228;

pub struct SimState {
    regs: [u8; 0x80],
    fifo: VecDeque<u8>,
    payload_ready: bool,
    packet_sent: bool,
    mode_ready_stalled: bool,
    tx_stalled: bool,
    absent: bool,
    transmitted: Vec<Vec<u8>>,
    rx_restarts: usize,
    transactions: usize,
}

impl SimState {
    fn new() -> Self {
        let mut regs = [0u8; 0x80];
        regs[REG_OPMODE as usize] = 0x04;
        regs[REG_PALEVEL as usize] = 0x9F;
        regs[REG_OCP as usize] = 0x1A;
        regs[REG_RSSIVALUE as usize] = QUIET_RSSI;
        regs[REG_PACKETCONFIG1 as usize] = 0x10;
        regs[REG_PACKETCONFIG2 as usize] = 0x02;
        regs[REG_TESTPA1 as usize] = 0x55;
        regs[REG_TESTPA2 as usize] = 0x70;

        Self {
            regs,
            fifo: VecDeque::new(),
            payload_ready: false,
            packet_sent: false,
            mode_ready_stalled: false,
            tx_stalled: false,
            absent: false,
            transmitted: Vec::new(),
            rx_restarts: 0,
            transactions: 0,
        }
    }

    fn mode(&self) -> u8 {
        (self.regs[REG_OPMODE as usize] >> 2) & 0x07
    }

    fn read(&mut self, address: u8) -> u8 {
        match address {
            REG_FIFO => {
                let byte = self.fifo.pop_front().unwrap_or(0);
                if self.fifo.is_empty() {
                    self.payload_ready = false;
                }
                byte
            }
            REG_RSSICONFIG => 0x02,
            REG_IRQFLAGS1 if self.mode_ready_stalled => 0x00,
            REG_IRQFLAGS1 => 0x80,
            REG_IRQFLAGS2 => {
                let mut flags = 0;
                if !self.fifo.is_empty() {
                    flags |= 0x40;
                }
                if self.packet_sent {
                    flags |= 0x08;
                }
                if self.payload_ready {
                    flags |= 0x04;
                }
                flags
            }
            REG_SYNCVALUE1 if self.absent => 0x00,
            _ => self.regs[address as usize],
        }
    }

    fn write(&mut self, address: u8, value: u8) {
        match address {
            REG_FIFO => self.fifo.push_back(value),
            REG_OPMODE => {
                self.regs[REG_OPMODE as usize] = value;
                self.packet_sent = false;
                if self.mode() == MODE_TX && !self.tx_stalled {
                    self.transmitted.push(self.fifo.drain(..).collect());
                    self.packet_sent = true;
                }
            }
            REG_PACKETCONFIG2 => {
                if value & 0x04 != 0 {
                    self.fifo.clear();
                    self.payload_ready = false;
                    self.rx_restarts += 1;
                }
                self.regs[REG_PACKETCONFIG2 as usize] = value & !0x04;
            }
            REG_RSSICONFIG => {}
            _ => self.regs[address as usize] = value,
        }
    }

    /// Whether the hardware address filter lets a frame for `target` through.
    fn filter_passes(&self, target: u8) -> bool {
        let node = self.regs[REG_NODEADRS as usize];
        let broadcast = self.regs[REG_BROADCASTADRS as usize];
        match (self.regs[REG_PACKETCONFIG1 as usize] >> 1) & 0x03 {
            0b01 => target == node,
            0b10 => target == node || target == broadcast,
            _ => true,
        }
    }
}

/// FIFO and auto-incrementing register bursts
fn burst_address(address: u8, offset: usize) -> u8 {
    if address == REG_FIFO {
        REG_FIFO
    } else {
        address + offset as u8
    }
}

/// Handle on one simulated transceiver
#[derive(Clone)]
pub struct Sim(Arc<Mutex<SimState>>);

impl Sim {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(SimState::new())))
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.0.lock().unwrap()
    }

    pub fn port(&self) -> SimPort {
        SimPort(self.clone())
    }

    pub fn dio0(&self) -> SimPin {
        SimPin(self.clone())
    }

    pub fn reg(&self, address: u8) -> u8 {
        self.state().regs[address as usize]
    }

    pub fn set_reg(&self, address: u8, value: u8) {
        self.state().regs[address as usize] = value;
    }

    pub fn mode(&self) -> u8 {
        self.state().mode()
    }

    pub fn set_rssi(&self, raw: u8) {
        self.set_reg(REG_RSSIVALUE, raw);
    }

    pub fn stall_mode_ready(&self, stalled: bool) {
        self.state().mode_ready_stalled = stalled;
    }

    pub fn stall_tx(&self, stalled: bool) {
        self.state().tx_stalled = stalled;
    }

    pub fn set_absent(&self, absent: bool) {
        self.state().absent = absent;
    }

    pub fn transactions(&self) -> usize {
        self.state().transactions
    }

    pub fn rx_restarts(&self) -> usize {
        self.state().rx_restarts
    }

    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state().transmitted.clone()
    }

    pub fn last_transmitted(&self) -> Vec<u8> {
        self.state()
            .transmitted
            .last()
            .cloned()
            .expect("nothing transmitted")
    }

    /// Puts a frame on the air for this node, subject to the hardware
    /// address filter. Returns whether it reached the FIFO.
    pub fn deliver(&self, frame: &[u8]) -> bool {
        let passes = frame.len() < 2 || self.state().filter_passes(frame[1]);
        passes && self.inject(frame)
    }

    /// Loads a frame into the FIFO as if the hardware filter were off.
    ///
    /// Only works while the receiver is on and the FIFO is free.
    pub fn inject(&self, frame: &[u8]) -> bool {
        let mut state = self.state();
        if state.mode() != MODE_RX || state.payload_ready {
            return false;
        }
        state.fifo.extend(frame.iter().copied());
        state.payload_ready = true;
        true
    }
}

pub struct SimPort(Sim);

impl RegisterPort for SimPort {
    fn read_register(&mut self, address: u8) -> Result<u8, Error> {
        let mut state = self.0.state();
        state.transactions += 1;
        Ok(state.read(address))
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error> {
        let mut state = self.0.state();
        state.transactions += 1;
        state.write(address, value);
        Ok(())
    }

    fn read_burst(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), Error> {
        let mut state = self.0.state();
        state.transactions += 1;
        for (offset, byte) in bytes.iter_mut().enumerate() {
            *byte = state.read(burst_address(address, offset));
        }
        Ok(())
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        let mut state = self.0.state();
        state.transactions += 1;
        for (offset, byte) in bytes.iter().enumerate() {
            state.write(burst_address(address, offset), *byte);
        }
        Ok(())
    }
}

/// DIO0 as wired by the mapping in RegDioMapping1
pub struct SimPin(Sim);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let state = self.0.state();
        let mapping = state.regs[REG_DIOMAPPING1 as usize] >> 6;
        Ok(match (mapping, state.mode()) {
            (0b00, MODE_TX) => state.packet_sent,
            (0b01, MODE_RX) => state.payload_ready,
            _ => false,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Advances one millisecond per reading
#[derive(Default)]
pub struct StepClock {
    now: u32,
}

impl Clock for StepClock {
    fn now_ms(&mut self) -> u32 {
        let now = self.now;
        self.now = self.now.wrapping_add(1);
        now
    }
}

/// Wall clock, for tests with a real interrupt thread
pub struct StdClock(Instant);

impl Default for StdClock {
    fn default() -> Self {
        Self(Instant::now())
    }
}

impl Clock for StdClock {
    fn now_ms(&mut self) -> u32 {
        self.0.elapsed().as_millis() as u32
    }
}

pub type SimRadio<C = StepClock> = Radio<SimPort, SimPin, C>;

/// An initialized node on the 915 MHz band.
pub fn node(address: u8, network_id: u8) -> (SimRadio, Sim) {
    node_with_clock(address, network_id, StepClock::default())
}

pub fn node_with_clock<C: Clock>(address: u8, network_id: u8, clock: C) -> (SimRadio<C>, Sim) {
    let sim = Sim::new();
    let mut radio = Radio::new(sim.port(), sim.dio0(), clock, false);
    assert_eq!(
        radio.initialize(FrequencyBand::Mhz915, address, network_id),
        Ok(true)
    );
    (radio, sim)
}
