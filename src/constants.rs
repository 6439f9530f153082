//! Network protocol and chip memory layout constants
//!
//! Frame layout constants describe the fixed Ethernet + IPv4 + UDP framing
//! this driver emits. SRAM addresses follow the ENC424J600 power-on layout.

/// Ethernet address length (MAC address)
pub const ETH_ALEN: usize = 6;

/// Ethernet protocol type: IPv4
pub const ETH_P_IP: u16 = 0x0800;

/// IP protocol number: UDP
pub const IPPROTO_UDP: u8 = 0x11;

/// IPv4 version nibble
pub const IPV4_VERSION: u8 = 4;

/// Version 4, IHL 5 (no options)
pub const IPV4_VERSION_IHL: u8 = 0x45;

/// Time to live of emitted datagrams
pub const IPV4_DEFAULT_TTL: u8 = 0x80;

/// Minimum (option-less) IPv4 header length
pub const IPV4_HLEN: usize = 20;

/// Offset of the header checksum inside an IPv4 header
pub const IPV4_CHECKSUM_OFFSET: usize = 10;

/// UDP header length
pub const UDP_HLEN: usize = 8;

/// Offset of the checksum inside a UDP header
pub const UDP_CHECKSUM_OFFSET: usize = 6;

/// Transmitted header: destination MAC (6) + EtherType (2) + IPv4 (20) + UDP (8).
/// The source MAC is inserted by the chip.
pub const TX_HEADER_LEN: usize = ETH_ALEN + 2 + IPV4_HLEN + UDP_HLEN;

/// Offset of the IPv4 header inside the transmitted header
pub const TX_IPV4_OFFSET: usize = ETH_ALEN + 2;

/// Offset of the UDP header inside the transmitted header
pub const TX_UDP_OFFSET: usize = TX_IPV4_OFFSET + IPV4_HLEN;

/// Largest UDP payload that keeps the IPv4 datagram within a 1500 byte MTU
pub const MAX_UDP_PAYLOAD: usize = 1472;

/// Pseudo-header (12) followed by the UDP header (8), summed in software
pub const PSEUDO_HEADER_LEN: usize = 20;

/// Length of the next-packet pointer preceding each received packet
pub const RX_NEXT_PTR_LEN: usize = 2;

/// Receive Status Vector length (ENC424J600 data sheet, table 9-1)
pub const RSV_LENGTH: usize = 6;

/// Value written to EUDAST to verify the SPI interface is alive
pub const HANDSHAKE_PATTERN: u16 = 0x1234;

/// SRAM Addresses
pub const ERXST_DEFAULT: u16 = 0x5340;
pub const ERXTAIL_DEFAULT: u16 = 0x5ffe;
pub const RX_MAX_ADDRESS: u16 = 0x5fff;

/// Start of the general-purpose (transmit staging) SRAM area
pub const GPBUFST_DEFAULT: u16 = 0x0000;
/// Size of one transmit staging slot; holds a full 1508 byte frame
pub const TX_SLOT_SIZE: u16 = 0x0600;

/// Delay after a system reset before registers may be accessed
pub const RESET_DELAY_US: u64 = 50;

/// Delay after a system reset before the PHY is usable
pub const PHY_START_DELAY_US: u64 = 500;
