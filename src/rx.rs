//! UDP receive path

use alloc::vec;
use core::net::Ipv4Addr;

use crate::constants::*;
use crate::enc424j600::Enc424j600;
use crate::error::{EncError, Result};
use crate::transport::{BufferReader, SpiBus};
use crate::types::{ReceiveStatusVector, UdpDatagram, UdpEndpoint};

impl<B: SpiBus> Enc424j600<B> {
    /// Read the next packet out of the receive ring as a UDP datagram.
    ///
    /// The caller must know a packet is pending (ESTAT.PKTCNT or the packet
    /// interrupt). The packet is released from the ring whether or not it
    /// decodes; the UDP checksum is not verified.
    pub fn receive_frame(&mut self) -> Result<UdpDatagram> {
        self.ensure_ready()?;
        let max_payload = self.config.max_rx_payload;

        self.ring.seek_next(&mut self.transport);
        let (next, decoded) = {
            let mut reader = self.transport.read_buffer();
            let next = reader.read_u16_le();
            let decoded = decode_udp(&mut reader, max_payload);
            (next, decoded)
        };
        self.ring.advance_after_receive(&mut self.transport, next);

        match &decoded {
            Ok(datagram) => debug!(
                "ENC424J600: received {} bytes {}:{} -> {}:{}",
                datagram.payload.len(),
                datagram.source.ip,
                datagram.source.port,
                datagram.destination.ip,
                datagram.destination.port
            ),
            Err(err) => warn!("ENC424J600: dropped frame: {}", err),
        }
        decoded
    }
}

/// Decode one packet following its next-packet pointer
fn decode_udp<B: SpiBus>(
    reader: &mut BufferReader<'_, B>,
    max_payload: usize,
) -> Result<UdpDatagram> {
    let rsv = ReceiveStatusVector::new(reader.read_array());
    trace!("ENC424J600: RSV {:02x?}, {} bytes", rsv.raw(), rsv.frame_length());

    // destination and source MAC
    reader.skip(2 * ETH_ALEN);
    if reader.read_u16_be() != ETH_P_IP {
        return Err(EncError::NotIpv4);
    }

    let ip: [u8; IPV4_HLEN] = reader.read_array();
    let hlen = 4 * usize::from(ip[0] & 0x0f);
    // options are skipped, not parsed
    reader.skip(hlen.saturating_sub(IPV4_HLEN));
    if ip[0] >> 4 != IPV4_VERSION {
        return Err(EncError::NotIpv4);
    }
    trace!(
        "ENC424J600: IPv4 total length {}",
        u16::from_be_bytes([ip[2], ip[3]])
    );
    if ip[9] != IPPROTO_UDP {
        return Err(EncError::NotUdp);
    }
    let source_ip = Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]);
    let destination_ip = Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]);

    let udp: [u8; UDP_HLEN] = reader.read_array();
    let source_port = u16::from_be_bytes([udp[0], udp[1]]);
    let destination_port = u16::from_be_bytes([udp[2], udp[3]]);
    let payload_len = usize::from(u16::from_be_bytes([udp[4], udp[5]]))
        .checked_sub(UDP_HLEN)
        .ok_or(EncError::MalformedUdp)?;
    if payload_len > max_payload {
        return Err(EncError::OversizePayload);
    }

    let mut payload = vec![0u8; payload_len];
    reader.read_into(&mut payload);

    Ok(UdpDatagram {
        source: UdpEndpoint::new(source_ip, source_port),
        destination: UdpEndpoint::new(destination_ip, destination_port),
        payload,
    })
}
