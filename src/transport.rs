//! SPI register transport
//!
//! Every chip access is one chip-select framed transaction: the opcode byte,
//! then address and/or data bytes. 16-bit values travel low byte first.

use core::time::Duration;

use crate::config::Timeouts;
use crate::error::{EncError, Result, WaitCondition};
use crate::regs::{Opcode, Register};
use crate::{KernelFunc, UseKernelFunc};

/// Dummy byte shifted out during SPI read cycles
const DUMMY: u8 = 0x00;

/// Full-duplex SPI master wired to the controller
///
/// `transfer` must return only after the byte has been shifted out and the
/// answer clocked in (the bus-ready flag is the implementation's concern).
pub trait SpiBus {
    /// Assert chip select
    fn select(&mut self);

    /// Deassert chip select
    fn deselect(&mut self);

    /// Shift one byte out and return the byte shifted in
    fn transfer(&mut self, byte: u8) -> u8;
}

impl<B: SpiBus + ?Sized> SpiBus for &mut B {
    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        (**self).transfer(byte)
    }
}

/// Typed access to the controller's SPI instruction set
///
/// Owning the bus through `&mut self` keeps transactions from interleaving.
pub struct RegisterTransport<B> {
    bus: B,
}

impl<B: SpiBus> RegisterTransport<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn transaction<R>(&mut self, f: impl FnOnce(&mut B) -> R) -> R {
        self.bus.select();
        let ret = f(&mut self.bus);
        self.bus.deselect();
        ret
    }

    fn command(&mut self, op: Opcode) {
        trace!("ENC424J600: opcode {:#04x}", op as u8);
        self.transaction(|bus| {
            bus.transfer(op as u8);
        });
    }

    fn register_command(&mut self, op: Opcode, reg: Register, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.transaction(|bus| {
            bus.transfer(op as u8);
            bus.transfer(reg.addr());
            bus.transfer(lo);
            bus.transfer(hi);
        });
    }

    /// Read Control Register, Unbanked
    pub fn read_register(&mut self, reg: Register) -> u16 {
        let value = self.transaction(|bus| {
            bus.transfer(Opcode::Rcru as u8);
            bus.transfer(reg.addr());
            let lo = bus.transfer(DUMMY);
            let hi = bus.transfer(DUMMY);
            u16::from_le_bytes([lo, hi])
        });
        trace!("ENC424J600: read {:?} = {:#06x}", reg, value);
        value
    }

    /// Write Control Register, Unbanked
    pub fn write_register(&mut self, reg: Register, value: u16) {
        trace!("ENC424J600: write {:?} = {:#06x}", reg, value);
        self.register_command(Opcode::Wcru, reg, value);
    }

    /// Bit Field Set, Unbanked
    pub fn set_bits(&mut self, reg: Register, mask: u16) {
        trace!("ENC424J600: set {:?} |= {:#06x}", reg, mask);
        self.register_command(Opcode::Bfsu, reg, mask);
    }

    /// Bit Field Clear, Unbanked
    pub fn clear_bits(&mut self, reg: Register, mask: u16) {
        trace!("ENC424J600: clear {:?} &= !{:#06x}", reg, mask);
        self.register_command(Opcode::Bfcu, reg, mask);
    }

    /// System reset. All registers return to their power-on values.
    pub fn reset(&mut self) {
        self.command(Opcode::SetEthRst);
    }

    /// Re-arm the interrupt system with the given EIE mask
    pub fn enable_interrupts(&mut self, mask: u16) {
        self.write_register(Register::Eie, mask);
    }

    /// Clear EIE.INTIE; the INT line goes inactive
    pub fn disable_interrupts(&mut self) {
        self.command(Opcode::ClrEie);
    }

    /// Start a DMA checksum over EDMAST/EDMALEN with the default seed
    pub fn start_checksum_dma(&mut self) {
        self.command(Opcode::DmaCksum);
    }

    /// Set ECON1.TXRTS
    pub fn request_transmit(&mut self) {
        self.command(Opcode::SetTxRts);
    }

    /// Write General Purpose Buffer Write Pointer
    pub fn write_gp_pointer(&mut self, addr: u16) {
        trace!("ENC424J600: EGPWRPT <- {:#06x}", addr);
        let [lo, hi] = addr.to_le_bytes();
        self.transaction(|bus| {
            bus.transfer(Opcode::Wgpwrpt as u8);
            bus.transfer(lo);
            bus.transfer(hi);
        });
    }

    /// Bulk write at EGPWRPT, all chunks in a single transaction
    pub fn write_buffer(&mut self, chunks: &[&[u8]]) {
        self.transaction(|bus| {
            bus.transfer(Opcode::Wgpdata as u8);
            for byte in chunks.iter().flat_map(|chunk| chunk.iter()) {
                bus.transfer(*byte);
            }
        });
    }

    /// Read `reg` until `done` accepts its value or `limit` elapses
    pub fn poll_register(
        &mut self,
        reg: Register,
        timeouts: &Timeouts,
        limit: Duration,
        waiting_for: WaitCondition,
        done: impl Fn(u16) -> bool,
    ) -> Result<u16> {
        for attempt in 0..timeouts.attempts(limit) {
            if attempt > 0 {
                UseKernelFunc::busy_wait(timeouts.poll_interval);
            }
            let value = self.read_register(reg);
            if done(value) {
                return Ok(value);
            }
        }
        warn!("ENC424J600: timed out waiting for {} ({:?})", waiting_for, reg);
        Err(EncError::Timeout(waiting_for))
    }

    /// Open a sequential read at ERXRDPT. The transaction ends when the
    /// returned reader is dropped.
    pub fn read_buffer(&mut self) -> BufferReader<'_, B> {
        self.bus.select();
        self.bus.transfer(Opcode::Rrxdata as u8);
        BufferReader { bus: &mut self.bus }
    }
}

/// An open Read Receive Buffer Data transaction
pub struct BufferReader<'a, B: SpiBus> {
    bus: &'a mut B,
}

impl<B: SpiBus> BufferReader<'_, B> {
    pub fn read_into(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.bus.transfer(DUMMY);
        }
    }

    pub fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0u8; N];
        self.read_into(&mut buf);
        buf
    }

    pub fn read_u16_le(&mut self) -> u16 {
        u16::from_le_bytes(self.read_array())
    }

    pub fn read_u16_be(&mut self) -> u16 {
        u16::from_be_bytes(self.read_array())
    }

    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.bus.transfer(DUMMY);
        }
    }
}

impl<B: SpiBus> Drop for BufferReader<'_, B> {
    fn drop(&mut self) {
        self.bus.deselect();
    }
}
