//! Register-level model of the ENC424J600 for host tests

use alloc::vec;
use alloc::vec::Vec;

use crate::checksum::{fold, internet_checksum, ones_complement_sum};
use crate::constants::*;
use crate::regs::{Econ1, Econ2, Eie, Estat, Opcode, Register};
use crate::transport::SpiBus;
use crate::types::{MacAddress, UdpEndpoint};
use crate::KernelFunc;

/// Polls in tests spin without delay
struct TestKernel;

#[crate_interface::impl_interface]
impl KernelFunc for TestKernel {
    fn busy_wait(_duration: core::time::Duration) {}
}

const SRAM_SIZE: usize = 0x6000;
/// ERXFCON power-on value: CRCEN | RUNTEN | UCEN | BCEN
const ERXFCON_DEFAULT: u16 = 0x0059;
/// ECON1 reads that DMAST stays set after a checksum request
const DMA_BUSY_READS: u32 = 2;

pub struct FakeEnc {
    regs: [u8; 256],
    sram: Vec<u8>,
    mac: MacAddress,
    selected: bool,
    current: Vec<u8>,
    last: Vec<u8>,
    register_reads: usize,
    resets: usize,
    dma_runs: usize,
    dma_remaining: Option<u32>,
    dma_stuck: bool,
    tx_remaining: Option<u32>,
    tx_busy_reads: u32,
    tx_stuck: bool,
    tx_overlap: bool,
    transmitted: Vec<Vec<u8>>,
    clock_ready: bool,
    handshake_broken: bool,
    reset_ignored: bool,
    rx_write_addr: u16,
}

impl FakeEnc {
    pub fn new() -> Self {
        let mut enc = Self {
            regs: [0; 256],
            sram: vec![0; SRAM_SIZE],
            mac: [0x00, 0x04, 0xa3, 0x00, 0x00, 0x01],
            selected: false,
            current: Vec::new(),
            last: Vec::new(),
            register_reads: 0,
            resets: 0,
            dma_runs: 0,
            dma_remaining: None,
            dma_stuck: false,
            tx_remaining: None,
            tx_busy_reads: 0,
            tx_stuck: false,
            tx_overlap: false,
            transmitted: Vec::new(),
            clock_ready: true,
            handshake_broken: false,
            reset_ignored: false,
            rx_write_addr: ERXST_DEFAULT,
        };
        enc.power_on();
        enc
    }

    fn power_on(&mut self) {
        self.regs = [0; 256];
        self.put(Register::Erxst, ERXST_DEFAULT);
        self.put(Register::Erxtail, ERXTAIL_DEFAULT);
        self.put(Register::Erxfcon, ERXFCON_DEFAULT);
        self.put(Register::Econ2, Econ2::ETHEN.bits() | Econ2::STRCH.bits());
        self.set_clock_ready(self.clock_ready);
        self.set_mac(self.mac);
        self.dma_remaining = None;
        self.tx_remaining = None;
        self.rx_write_addr = ERXST_DEFAULT;
    }

    fn get_addr(&self, addr: u8) -> u16 {
        let addr = usize::from(addr);
        u16::from_le_bytes([self.regs[addr], self.regs[addr + 1]])
    }

    fn put_addr(&mut self, addr: u8, value: u16) {
        let addr = usize::from(addr);
        self.regs[addr..addr + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn put(&mut self, reg: Register, value: u16) {
        self.put_addr(reg.addr(), value);
    }

    pub fn reg(&self, reg: Register) -> u16 {
        self.get_addr(reg.addr())
    }

    pub fn set_register(&mut self, reg: Register, value: u16) {
        self.put(reg, value);
    }

    pub fn sram(&self, addr: u16, len: usize) -> &[u8] {
        let addr = usize::from(addr);
        &self.sram[addr..addr + len]
    }

    pub fn load_sram(&mut self, addr: u16, bytes: &[u8]) {
        let addr = usize::from(addr);
        self.sram[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub fn last_transaction(&self) -> &[u8] {
        &self.last
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn register_reads(&self) -> usize {
        self.register_reads
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn dma_runs(&self) -> usize {
        self.dma_runs
    }

    pub fn transmitted(&self) -> &[Vec<u8>] {
        &self.transmitted
    }

    /// True if TXRTS was requested while a transmission was still running
    pub fn tx_request_overlapped(&self) -> bool {
        self.tx_overlap
    }

    pub fn gp_write_pointer(&self) -> u16 {
        self.reg(Register::Egpwrpt)
    }

    pub fn packet_count(&self) -> u8 {
        (self.reg(Register::Estat) & Estat::PKTCNT.bits()) as u8
    }

    pub fn set_packet_count(&mut self, count: u8) {
        let estat = self.reg(Register::Estat) & !Estat::PKTCNT.bits();
        self.put(Register::Estat, estat | u16::from(count));
    }

    pub fn set_mac(&mut self, mac: MacAddress) {
        self.mac = mac;
        self.put(Register::Maadr1, u16::from_le_bytes([mac[0], mac[1]]));
        self.put(Register::Maadr2, u16::from_le_bytes([mac[2], mac[3]]));
        self.put(Register::Maadr3, u16::from_le_bytes([mac[4], mac[5]]));
    }

    pub fn set_clock_ready(&mut self, ready: bool) {
        self.clock_ready = ready;
        let mut estat = Estat::from_bits_retain(self.reg(Register::Estat));
        estat.set(Estat::CLKRDY, ready);
        self.put(Register::Estat, estat.bits());
    }

    pub fn set_handshake_broken(&mut self, broken: bool) {
        self.handshake_broken = broken;
    }

    pub fn set_reset_ignored(&mut self, ignored: bool) {
        self.reset_ignored = ignored;
    }

    pub fn set_dma_stuck(&mut self, stuck: bool) {
        self.dma_stuck = stuck;
    }

    /// ECON1 reads TXRTS stays set for after each transmit request
    pub fn set_tx_busy_reads(&mut self, reads: u32) {
        self.tx_busy_reads = reads;
    }

    pub fn set_tx_stuck(&mut self, stuck: bool) {
        self.tx_stuck = stuck;
    }

    pub fn set_rx_write_addr(&mut self, addr: u16) {
        self.rx_write_addr = addr;
    }

    /// Store a received frame the way the receiver does and bump PKTCNT.
    /// Returns the address of the following packet.
    pub fn inject_packet(&mut self, frame: &[u8]) -> u16 {
        self.write_packet(frame, None)
    }

    /// Like [`inject_packet`](Self::inject_packet) with a forced next-packet link
    pub fn inject_packet_with_next(&mut self, frame: &[u8], next: u16) -> u16 {
        self.write_packet(frame, Some(next))
    }

    fn write_packet(&mut self, frame: &[u8], link: Option<u16>) -> u16 {
        let ring_start = usize::from(self.reg(Register::Erxst));
        let ring_len = usize::from(RX_MAX_ADDRESS) + 1 - ring_start;
        let start = usize::from(self.rx_write_addr);

        let mut next = start + RX_NEXT_PTR_LEN + RSV_LENGTH + frame.len();
        // packets start on even addresses
        next += next % 2;
        if next > usize::from(RX_MAX_ADDRESS) {
            next -= ring_len;
        }
        let next = next as u16;

        // byte count includes the 4 byte FCS; 0x80 = received ok
        let count = (frame.len() + 4) as u16;
        let [count_lo, count_hi] = count.to_le_bytes();
        let rsv = [count_lo, count_hi, 0x00, 0x00, 0x80, 0x00];

        let mut addr = start;
        let link = link.unwrap_or(next).to_le_bytes();
        for byte in link.iter().chain(rsv.iter()).chain(frame.iter()) {
            self.sram[addr] = *byte;
            addr += 1;
            if addr > usize::from(RX_MAX_ADDRESS) {
                addr = ring_start;
            }
        }

        self.rx_write_addr = next;
        self.set_packet_count(self.packet_count() + 1);
        next
    }

    fn read_side_effects(&mut self, addr: u8) {
        self.register_reads += 1;
        if addr != Register::Econ1.addr() {
            return;
        }
        let mut econ1 = Econ1::from_bits_retain(self.reg(Register::Econ1));
        if econ1.contains(Econ1::DMAST) {
            match self.dma_remaining {
                Some(0) => {
                    econ1.remove(Econ1::DMAST);
                    self.dma_remaining = None;
                }
                Some(n) => self.dma_remaining = Some(n - 1),
                None => {}
            }
        }
        if econ1.contains(Econ1::TXRTS) {
            match self.tx_remaining {
                Some(0) => {
                    econ1.remove(Econ1::TXRTS);
                    self.tx_remaining = None;
                }
                Some(n) => self.tx_remaining = Some(n - 1),
                None => {}
            }
        }
        self.put(Register::Econ1, econ1.bits());
    }

    fn write_register(&mut self, addr: u8, value: u16) {
        if addr == Register::Eudast.addr() && self.handshake_broken {
            return;
        }
        self.put_addr(addr, value);
    }

    fn set_bits(&mut self, addr: u8, mask: u16) {
        let mut mask = mask;
        if addr == Register::Econ1.addr() && mask & Econ1::PKTDEC.bits() != 0 {
            self.set_packet_count(self.packet_count().saturating_sub(1));
            mask &= !Econ1::PKTDEC.bits();
        }
        let value = self.get_addr(addr) | mask;
        self.put_addr(addr, value);
    }

    fn clear_bits(&mut self, addr: u8, mask: u16) {
        let value = self.get_addr(addr) & !mask;
        self.put_addr(addr, value);
    }

    fn system_reset(&mut self) {
        self.resets += 1;
        if !self.reset_ignored {
            self.power_on();
        }
    }

    fn start_dma_checksum(&mut self) {
        self.dma_runs += 1;
        let start = usize::from(self.reg(Register::Edmast));
        let len = usize::from(self.reg(Register::Edmalen));
        let sum = fold(ones_complement_sum(&self.sram[start..start + len], 0));
        // the chip reports the complemented sum with its bytes swapped
        self.put(Register::Edmacs, (!sum).swap_bytes());
        self.set_bits(Register::Econ1.addr(), Econ1::DMAST.bits());
        self.dma_remaining = if self.dma_stuck {
            None
        } else {
            Some(DMA_BUSY_READS)
        };
    }

    fn request_transmit(&mut self) {
        let econ1 = Econ1::from_bits_retain(self.reg(Register::Econ1));
        if econ1.contains(Econ1::TXRTS) {
            self.tx_overlap = true;
        }

        let start = usize::from(self.reg(Register::Etxst));
        let len = usize::from(self.reg(Register::Etxlen));
        let staged = &self.sram[start..start + len];
        let mut frame = Vec::with_capacity(len + ETH_ALEN);
        if Econ2::from_bits_retain(self.reg(Register::Econ2)).contains(Econ2::TXMAC) {
            frame.extend_from_slice(&staged[..ETH_ALEN]);
            frame.extend_from_slice(&self.mac);
            frame.extend_from_slice(&staged[ETH_ALEN..]);
        } else {
            frame.extend_from_slice(staged);
        }
        self.transmitted.push(frame);

        self.set_bits(Register::Econ1.addr(), Econ1::TXRTS.bits());
        self.tx_remaining = if self.tx_stuck {
            None
        } else {
            Some(self.tx_busy_reads)
        };
    }

    /// Handle one MOSI byte of the open transaction, return the MISO byte
    fn clock_byte(&mut self, byte: u8) -> u8 {
        let pos = self.current.len();
        self.current.push(byte);
        if pos == 0 {
            return 0;
        }
        match Opcode::from_u8(self.current[0]) {
            Some(Opcode::Rcru) if pos == 2 => {
                let addr = self.current[1];
                self.read_side_effects(addr);
                self.regs[usize::from(addr)]
            }
            Some(Opcode::Rcru) if pos == 3 => self.regs[usize::from(self.current[1]) + 1],
            Some(Opcode::Wgpdata) => {
                let ptr = self.reg(Register::Egpwrpt);
                self.sram[usize::from(ptr)] = byte;
                self.put(Register::Egpwrpt, (ptr + 1) % SRAM_SIZE as u16);
                0
            }
            Some(Opcode::Rrxdata) => {
                let ptr = self.reg(Register::Erxrdpt);
                let value = self.sram[usize::from(ptr)];
                let next = if ptr >= RX_MAX_ADDRESS {
                    self.reg(Register::Erxst)
                } else {
                    ptr + 1
                };
                self.put(Register::Erxrdpt, next);
                value
            }
            _ => 0,
        }
    }

    /// Execute a completed fixed-length command
    fn finish_transaction(&mut self) {
        let bytes = core::mem::take(&mut self.current);
        let Some(&op) = bytes.first() else {
            return;
        };
        match (Opcode::from_u8(op), bytes.as_slice()) {
            (Some(Opcode::Wcru), &[_, addr, lo, hi]) => {
                self.write_register(addr, u16::from_le_bytes([lo, hi]))
            }
            (Some(Opcode::Bfsu), &[_, addr, lo, hi]) => {
                self.set_bits(addr, u16::from_le_bytes([lo, hi]))
            }
            (Some(Opcode::Bfcu), &[_, addr, lo, hi]) => {
                self.clear_bits(addr, u16::from_le_bytes([lo, hi]))
            }
            (Some(Opcode::Wgpwrpt), &[_, lo, hi]) => {
                self.put(Register::Egpwrpt, u16::from_le_bytes([lo, hi]))
            }
            (Some(Opcode::SetEthRst), &[_]) => self.system_reset(),
            (Some(Opcode::SetTxRts), &[_]) => self.request_transmit(),
            (Some(Opcode::DmaCksum), &[_]) => self.start_dma_checksum(),
            (Some(Opcode::ClrEie), &[_]) => self.clear_bits(Register::Eie.addr(), Eie::INTIE.bits()),
            _ => {}
        }
        self.last = bytes;
    }
}

impl SpiBus for FakeEnc {
    fn select(&mut self) {
        assert!(!self.selected, "chip select asserted twice");
        self.selected = true;
    }

    fn deselect(&mut self) {
        assert!(self.selected, "chip select released while idle");
        self.selected = false;
        self.finish_transaction();
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        assert!(self.selected, "transfer without chip select");
        self.clock_byte(byte)
    }
}

/// Build a complete Ethernet II frame carrying a UDP datagram.
/// The UDP checksum is left at zero.
pub fn udp_frame(
    dest_mac: &MacAddress,
    src_mac: &MacAddress,
    source: &UdpEndpoint,
    destination: &UdpEndpoint,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(dest_mac);
    frame.extend_from_slice(src_mac);
    frame.extend_from_slice(&ETH_P_IP.to_be_bytes());

    let total_len = (IPV4_HLEN + UDP_HLEN + payload.len()) as u16;
    let mut ip = [0u8; IPV4_HLEN];
    ip[0] = IPV4_VERSION_IHL;
    ip[2..4].copy_from_slice(&total_len.to_be_bytes());
    ip[8] = 64;
    ip[9] = IPPROTO_UDP;
    ip[12..16].copy_from_slice(&source.ip.octets());
    ip[16..20].copy_from_slice(&destination.ip.octets());
    let checksum = internet_checksum(&ip);
    ip[10..12].copy_from_slice(&checksum.to_be_bytes());
    frame.extend_from_slice(&ip);

    frame.extend_from_slice(&source.port.to_be_bytes());
    frame.extend_from_slice(&destination.port.to_be_bytes());
    frame.extend_from_slice(&((UDP_HLEN + payload.len()) as u16).to_be_bytes());
    frame.extend_from_slice(&[0, 0]);
    frame.extend_from_slice(payload);
    frame
}
