//! Internet checksums (RFC 1071)
//!
//! The IPv4 header checksum is computed entirely in software. The UDP
//! checksum is split: the payload already sits in chip SRAM, so the DMA
//! checksum unit sums it while software sums the pseudo-header and the UDP
//! header. The two partial sums are then combined.

use core::net::Ipv4Addr;

use crate::config::Timeouts;
use crate::constants::*;
use crate::error::{EncError, Result, WaitCondition};
use crate::regs::{Econ1, Register};
use crate::transport::{RegisterTransport, SpiBus};

/// Add `data` as big-endian 16-bit words to `sum`.
/// An odd trailing byte is padded with a zero low byte.
pub fn ones_complement_sum(data: &[u8], mut sum: u32) -> u32 {
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
        // fold early so long buffers cannot overflow the accumulator
        if sum > 0xffff {
            sum = (sum & 0xffff) + (sum >> 16);
        }
    }
    if let [last] = words.remainder() {
        sum += u32::from(*last) << 8;
    }
    sum
}

/// End-around carry: fold the upper half into the lower until nothing is left
pub fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// Software-only checksum of `data`
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold(ones_complement_sum(data, 0))
}

/// Compute the header checksum of an IPv4 header in place and return it.
///
/// The header length comes from the IHL nibble; `header` may be longer.
pub fn ipv4_header_checksum(header: &mut [u8]) -> Result<u16> {
    let ihl = header.first().map(|b| b & 0x0f).ok_or(EncError::InvalidHeader)?;
    let hlen = 4 * usize::from(ihl);
    if hlen < IPV4_HLEN || header.len() < hlen {
        return Err(EncError::InvalidHeader);
    }

    let field = IPV4_CHECKSUM_OFFSET..IPV4_CHECKSUM_OFFSET + 2;
    header[field.clone()].fill(0);
    let checksum = internet_checksum(&header[..hlen]);
    header[field].copy_from_slice(&checksum.to_be_bytes());
    Ok(checksum)
}

/// UDP pseudo-header followed by the UDP header
///
/// Checksum input only, never transmitted:
///
/// ```text
///  0..4   source IP
///  4..8   destination IP
///  8      zero
///  9      protocol (0x11)
/// 10..12  UDP length
/// 12..20  UDP header with a zero checksum
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudoHeader {
    bytes: [u8; PSEUDO_HEADER_LEN],
}

impl PseudoHeader {
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, udp_header: &[u8]) -> Self {
        let mut bytes = [0u8; PSEUDO_HEADER_LEN];
        bytes[0..4].copy_from_slice(&source.octets());
        bytes[4..8].copy_from_slice(&destination.octets());
        bytes[9] = IPPROTO_UDP;
        // the UDP length appears twice: once here, once inside the UDP header
        let udp = &mut bytes[12..];
        let n = udp_header.len().min(UDP_HLEN);
        udp[..n].copy_from_slice(&udp_header[..n]);
        udp[UDP_CHECKSUM_OFFSET..].fill(0);
        let udp_len = [udp[4], udp[5]];
        bytes[10..12].copy_from_slice(&udp_len);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; PSEUDO_HEADER_LEN] {
        &self.bytes
    }
}

/// Convert the EDMACS register value into a payload partial sum.
///
/// EDMACS holds the complemented checksum with its bytes swapped relative
/// to the big-endian words summed in software.
pub const fn hardware_partial_sum(edmacs: u16) -> u16 {
    !edmacs.swap_bytes()
}

/// Combine the software and hardware partial sums into the final checksum.
///
/// A result of zero is sent as 0xffff; zero means "no checksum" in UDP.
pub fn combine_partial_sums(header_sum: u16, payload_sum: u16) -> u16 {
    // 32-bit add so the carry of the combination is kept
    let sum = u32::from(header_sum) + u32::from(payload_sum);
    match !fold(sum) {
        0 => 0xffff,
        checksum => checksum,
    }
}

/// Compute the UDP checksum of a datagram whose payload is staged in chip
/// SRAM at `payload_addr`.
///
/// The DMA checksum runs while the pseudo-header is summed in software. An
/// empty payload skips the DMA and contributes zero.
pub fn udp_checksum<B: SpiBus>(
    transport: &mut RegisterTransport<B>,
    timeouts: &Timeouts,
    pseudo: &PseudoHeader,
    payload_addr: u16,
    payload_len: u16,
) -> Result<u16> {
    if payload_len > 0 {
        transport.write_register(Register::Edmast, payload_addr);
        transport.write_register(Register::Edmalen, payload_len);
        // DMACPY, DMANOCS and DMACSSD are left clear by the opcode
        transport.start_checksum_dma();
    }

    let header_sum = fold(ones_complement_sum(pseudo.as_bytes(), 0));

    let payload_sum = if payload_len > 0 {
        transport.poll_register(
            Register::Econ1,
            timeouts,
            timeouts.dma,
            WaitCondition::DmaChecksum,
            |econ1| !Econ1::from_bits_retain(econ1).contains(Econ1::DMAST),
        )?;
        hardware_partial_sum(transport.read_register(Register::Edmacs))
    } else {
        0
    };

    let checksum = combine_partial_sums(header_sum, payload_sum);
    trace!(
        "ENC424J600: UDP checksum {:#06x} (header {:#06x}, payload {:#06x})",
        checksum,
        header_sum,
        payload_sum
    );
    Ok(checksum)
}
