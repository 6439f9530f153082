//! Driver configuration

use core::time::Duration;

use crate::constants::{ERXTAIL_DEFAULT, MAX_UDP_PAYLOAD};
use crate::regs::{Econ2, Eie};

/// Upper bounds for every status poll the driver performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// SPI handshake and ESTAT.CLKRDY after power-up
    pub clock_ready: Duration,
    /// DMA checksum completion
    pub dma: Duration,
    /// Completion of the previous transmission
    pub transmit: Duration,
    /// Delay between two status reads
    pub poll_interval: Duration,
}

impl Timeouts {
    pub const fn new() -> Self {
        Self {
            clock_ready: Duration::from_millis(100),
            dma: Duration::from_millis(5),
            // a 1518 byte frame at 10 Mbit/s takes ~1.2 ms, leave room for collisions
            transmit: Duration::from_millis(50),
            poll_interval: Duration::from_micros(10),
        }
    }

    /// Number of status reads that fit into `limit`, at least one.
    pub fn attempts(&self, limit: Duration) -> u32 {
        let interval = self.poll_interval.as_nanos().max(1);
        let attempts = limit.as_nanos() / interval;
        attempts.clamp(1, u32::MAX as u128) as u32
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncConfig {
    pub timeouts: Timeouts,
    /// Value written to ECON2 during init
    pub econ2: u16,
    /// Value written to EIE when interrupts are (re)enabled
    pub interrupt_mask: u16,
    /// Tail written when the next-packet pointer wraps to 0
    pub rx_tail_wrap: u16,
    /// Largest UDP payload accepted on receive
    pub max_rx_payload: usize,
    /// Drop ff-ff-ff-ff-ff-ff frames in the receive filter
    pub reject_broadcast: bool,
}

impl EncConfig {
    pub const fn new() -> Self {
        Self {
            timeouts: Timeouts::new(),
            econ2: Econ2::ETHEN.bits() | Econ2::STRCH.bits() | Econ2::TXMAC.bits(),
            interrupt_mask: Eie::INTIE.bits() | Eie::PKTIE.bits(),
            rx_tail_wrap: ERXTAIL_DEFAULT,
            max_rx_payload: MAX_UDP_PAYLOAD,
            reject_broadcast: true,
        }
    }
}

impl Default for EncConfig {
    fn default() -> Self {
        Self::new()
    }
}
