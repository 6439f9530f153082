//! UDP transmit path

use crate::buffer::set_transmit_write_pointer;
use crate::checksum::{ipv4_header_checksum, udp_checksum, PseudoHeader};
use crate::constants::{MAX_UDP_PAYLOAD, TX_HEADER_LEN};
use crate::enc424j600::Enc424j600;
use crate::error::{EncError, Result, WaitCondition};
use crate::regs::{Econ1, Register};
use crate::transport::SpiBus;
use crate::types::{MacAddress, TxHeader, UdpEndpoint};

impl<B: SpiBus> Enc424j600<B> {
    /// Build and transmit a UDP datagram.
    ///
    /// The frame is staged in the general purpose buffer at `buffer_addr`.
    /// `buffer_addr` must differ from the one used by a transmission still in
    /// flight, or that frame gets corrupted. The source MAC is inserted by the
    /// chip. Waits for the previous transmission before requesting this one.
    pub fn send_frame(
        &mut self,
        source: UdpEndpoint,
        destination: UdpEndpoint,
        dest_mac: &MacAddress,
        buffer_addr: u16,
        payload: &[u8],
    ) -> Result<()> {
        self.ensure_ready()?;
        if payload.len() > MAX_UDP_PAYLOAD {
            warn!(
                "ENC424J600: refusing {} byte payload (max {})",
                payload.len(),
                MAX_UDP_PAYLOAD
            );
            return Err(EncError::OversizePayload);
        }
        let payload_len = payload.len() as u16;
        debug!(
            "ENC424J600: sending {} bytes {}:{} -> {}:{} from {:#06x}",
            payload_len,
            source.ip,
            source.port,
            destination.ip,
            destination.port,
            buffer_addr
        );

        let mut header = TxHeader::new(dest_mac, &source, &destination, payload_len);
        ipv4_header_checksum(header.ipv4_header_mut())?;
        let pseudo = PseudoHeader::new(source.ip, destination.ip, header.udp_header());

        set_transmit_write_pointer(&mut self.transport, buffer_addr);
        self.transport
            .write_register(Register::Etxlen, TX_HEADER_LEN as u16 + payload_len);
        self.transport
            .write_buffer(&[header.as_bytes().as_slice(), payload]);

        let payload_addr = buffer_addr.wrapping_add(TX_HEADER_LEN as u16);
        let timeouts = self.config.timeouts;
        let checksum = udp_checksum(
            &mut self.transport,
            &timeouts,
            &pseudo,
            payload_addr,
            payload_len,
        )?;

        let checksum_addr = buffer_addr.wrapping_add(TxHeader::udp_checksum_offset() as u16);
        self.transport.write_gp_pointer(checksum_addr);
        self.transport.write_buffer(&[&checksum.to_be_bytes()[..]]);

        self.start_transmission()
    }

    /// Transmit whatever is currently staged in the transmit buffer again
    pub fn resend_last_frame(&mut self) -> Result<()> {
        self.ensure_ready()?;
        debug!("ENC424J600: resending last frame");
        self.start_transmission()
    }

    /// Wait for the ongoing transmission to finish, then set TXRTS
    fn start_transmission(&mut self) -> Result<()> {
        let timeouts = self.config.timeouts;
        self.transport.poll_register(
            Register::Econ1,
            &timeouts,
            timeouts.transmit,
            WaitCondition::Transmit,
            |econ1| !Econ1::from_bits_retain(econ1).contains(Econ1::TXRTS),
        )?;
        self.transport.request_transmit();
        Ok(())
    }
}
