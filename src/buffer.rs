//! SRAM buffer pointer management
//!
//! Received packets form a chip-maintained linked list inside the receive
//! ring: each packet starts with the little-endian address of the next one.
//! The driver only has to remember where the next unread packet starts and
//! move ERXTAIL behind every packet it has finished with.

use crate::constants::{ERXST_DEFAULT, ERXTAIL_DEFAULT};
use crate::regs::{Econ1, Register};
use crate::transport::{RegisterTransport, SpiBus};

/// Receive ring bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxRing {
    /// ERXST as read at init
    start: u16,
    /// Tail written when the chip reports wraparound
    tail_wrap: u16,
    /// Start of the next unread packet
    next_packet: u16,
}

impl RxRing {
    pub const fn new(start: u16, tail_wrap: u16) -> Self {
        Self {
            start,
            tail_wrap,
            next_packet: start,
        }
    }

    pub const fn start(&self) -> u16 {
        self.start
    }

    pub const fn next_packet(&self) -> u16 {
        self.next_packet
    }

    /// Tail that releases everything before `next`
    pub const fn tail_for(&self, next: u16) -> u16 {
        if next == 0 {
            self.tail_wrap
        } else {
            next.wrapping_sub(2)
        }
    }

    /// Point ERXRDPT at the next unread packet
    pub fn seek_next<B: SpiBus>(&self, transport: &mut RegisterTransport<B>) {
        transport.write_register(Register::Erxrdpt, self.next_packet);
    }

    /// Release the packet just drained and follow its next-packet link.
    ///
    /// Must be called only after the whole packet has been read out, since
    /// moving the tail hands the memory back to the receiver.
    pub fn advance_after_receive<B: SpiBus>(
        &mut self,
        transport: &mut RegisterTransport<B>,
        next: u16,
    ) {
        self.next_packet = if next == 0 { self.start } else { next };
        let tail = self.tail_for(next);
        trace!(
            "ENC424J600: next packet at {:#06x}, tail {:#06x}",
            self.next_packet,
            tail
        );
        transport.write_register(Register::Erxtail, tail);
        transport.set_bits(Register::Econ1, Econ1::PKTDEC.bits());
    }
}

impl Default for RxRing {
    fn default() -> Self {
        Self::new(ERXST_DEFAULT, ERXTAIL_DEFAULT)
    }
}

/// Aim the general purpose write pointer and ETXST at `addr` before staging
/// a frame there.
pub fn set_transmit_write_pointer<B: SpiBus>(transport: &mut RegisterTransport<B>, addr: u16) {
    transport.write_gp_pointer(addr);
    transport.write_register(Register::Etxst, addr);
}
