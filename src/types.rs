//! Frame and datagram type definitions
//!
//! The transmit header is staged as a plain byte array in wire order; the
//! accessors below name the fields of that layout:
//!
//! ```text
//!  0..6   destination MAC     (source MAC is inserted by the chip)
//!  6..8   EtherType = 0x0800
//!  8..28  IPv4 header, IHL = 5
//! 28..36  UDP header
//! ```

use alloc::vec::Vec;
use core::net::Ipv4Addr;

use crate::constants::*;

/// 48-bit MAC address
pub type MacAddress = [u8; ETH_ALEN];

/// IPv4 address and UDP port of one side of a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpEndpoint {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl UdpEndpoint {
    pub const fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }
}

/// A received UDP datagram. The payload is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDatagram {
    pub source: UdpEndpoint,
    pub destination: UdpEndpoint,
    pub payload: Vec<u8>,
}

/// Receive Status Vector
///
/// See: Table 9-1, ENC424J600 Data Sheet. Only the byte count is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveStatusVector {
    raw: [u8; RSV_LENGTH],
}

impl ReceiveStatusVector {
    pub const fn new(raw: [u8; RSV_LENGTH]) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &[u8; RSV_LENGTH] {
        &self.raw
    }

    /// Received byte count, including the Ethernet header and FCS
    pub fn frame_length(&self) -> u16 {
        u16::from_le_bytes([self.raw[0], self.raw[1]])
    }
}

/// Ethernet + IPv4 + UDP header as written to the transmit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHeader {
    bytes: [u8; TX_HEADER_LEN],
}

impl TxHeader {
    /// Build the header for a datagram carrying `payload_len` bytes.
    /// Both checksum fields are left zero.
    pub fn new(
        dest_mac: &MacAddress,
        source: &UdpEndpoint,
        destination: &UdpEndpoint,
        payload_len: u16,
    ) -> Self {
        let mut bytes = [0u8; TX_HEADER_LEN];
        bytes[..ETH_ALEN].copy_from_slice(dest_mac);
        bytes[ETH_ALEN..TX_IPV4_OFFSET].copy_from_slice(&ETH_P_IP.to_be_bytes());

        let ip = &mut bytes[TX_IPV4_OFFSET..TX_UDP_OFFSET];
        ip[0] = IPV4_VERSION_IHL;
        ip[2..4].copy_from_slice(&ipv4_total_len(payload_len).to_be_bytes());
        // ID, flags and fragment offset stay zero
        ip[8] = IPV4_DEFAULT_TTL;
        ip[9] = IPPROTO_UDP;
        ip[12..16].copy_from_slice(&source.ip.octets());
        ip[16..20].copy_from_slice(&destination.ip.octets());

        let udp = &mut bytes[TX_UDP_OFFSET..];
        udp[0..2].copy_from_slice(&source.port.to_be_bytes());
        udp[2..4].copy_from_slice(&destination.port.to_be_bytes());
        udp[4..6].copy_from_slice(&udp_len(payload_len).to_be_bytes());

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; TX_HEADER_LEN] {
        &self.bytes
    }

    pub fn ipv4_header(&self) -> &[u8] {
        &self.bytes[TX_IPV4_OFFSET..TX_UDP_OFFSET]
    }

    pub fn ipv4_header_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[TX_IPV4_OFFSET..TX_UDP_OFFSET]
    }

    pub fn udp_header(&self) -> &[u8] {
        &self.bytes[TX_UDP_OFFSET..]
    }

    /// Offset of the UDP checksum field from the start of the header
    pub const fn udp_checksum_offset() -> usize {
        TX_UDP_OFFSET + UDP_CHECKSUM_OFFSET
    }
}

/// IPv4 total length for a UDP payload: IPv4 header (20) + UDP header (8) + data
pub const fn ipv4_total_len(payload_len: u16) -> u16 {
    (IPV4_HLEN + UDP_HLEN) as u16 + payload_len
}

/// UDP length field for a payload: UDP header (8) + data
pub const fn udp_len(payload_len: u16) -> u16 {
    UDP_HLEN as u16 + payload_len
}
