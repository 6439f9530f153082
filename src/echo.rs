//! UDP echo responder
//!
//! The body of the packet-received interrupt handler: mask chip interrupts,
//! pull one datagram out of the ring and send its payload back to a fixed
//! peer. Interrupts come back on when the guard drops, so a packet that
//! arrived in the meantime raises INT again immediately.

use core::net::Ipv4Addr;

use crate::constants::{GPBUFST_DEFAULT, TX_SLOT_SIZE};
use crate::enc424j600::Enc424j600;
use crate::error::Result;
use crate::transport::SpiBus;
use crate::types::{MacAddress, UdpEndpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoResponder {
    pub local_ip: Ipv4Addr,
    pub peer_ip: Ipv4Addr,
    pub peer_mac: MacAddress,
    pub port: u16,
    /// General purpose buffer address of the first of two staging slots
    pub tx_buffer: u16,
    /// Slot the next reply is staged in
    slot: usize,
}

impl EchoResponder {
    pub const fn new(
        local_ip: Ipv4Addr,
        peer_ip: Ipv4Addr,
        peer_mac: MacAddress,
        port: u16,
    ) -> Self {
        Self {
            local_ip,
            peer_ip,
            peer_mac,
            port,
            tx_buffer: GPBUFST_DEFAULT,
            slot: 0,
        }
    }

    /// Staging address for the next reply.
    ///
    /// Replies alternate between two slots so the frame being staged never
    /// overlaps the one the chip may still be transmitting.
    pub fn next_buffer(&self) -> u16 {
        self.tx_buffer.wrapping_add(self.slot as u16 * TX_SLOT_SIZE)
    }

    /// Service one pending packet.
    ///
    /// Returns the number of bytes echoed, or `None` when the frame was not
    /// a UDP datagram and got dropped.
    pub fn service<B: SpiBus>(&mut self, driver: &mut Enc424j600<B>) -> Result<Option<usize>> {
        let mut guard = driver.interrupts_masked();
        let datagram = match guard.receive_frame() {
            Ok(datagram) => datagram,
            Err(err) if err.is_frame_error() => return Ok(None),
            Err(err) => return Err(err),
        };

        guard.send_frame(
            UdpEndpoint::new(self.local_ip, self.port),
            UdpEndpoint::new(self.peer_ip, self.port),
            &self.peer_mac,
            self.next_buffer(),
            &datagram.payload,
        )?;
        // the slot just used is in flight until the next reply is requested
        self.slot ^= 1;
        Ok(Some(datagram.payload.len()))
    }
}
