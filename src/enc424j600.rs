//! ENC424J600/ENC624J600 10/100 Ethernet Controller Driver
//!
//! Bring-up follows the data sheet's reset sequence: prove the SPI link
//! with a scratch register, wait for the clock, reset, then enable the MAC
//! with automatic source address insertion. Frame transmit and receive live
//! in `tx.rs` and `rx.rs`.

use core::ops::{Deref, DerefMut};
use core::time::Duration;

use crate::buffer::RxRing;
use crate::config::EncConfig;
use crate::constants::{HANDSHAKE_PATTERN, PHY_START_DELAY_US, RESET_DELAY_US};
use crate::error::{EncError, Result, WaitCondition};
use crate::regs::{Econ1, Erxfcon, Estat, Register};
use crate::transport::{RegisterTransport, SpiBus};
use crate::types::MacAddress;
use crate::{KernelFunc, UseKernelFunc};

/// ENC424J600 device driver
pub struct Enc424j600<B> {
    pub(crate) transport: RegisterTransport<B>,
    pub(crate) ring: RxRing,
    pub(crate) config: EncConfig,
    /// MAC address
    mac_addr: MacAddress,
    ready: bool,
}

impl<B: SpiBus> Enc424j600<B> {
    /// Create a driver instance. Nothing is sent on the bus until [`init`].
    ///
    /// [`init`]: Self::init
    pub fn new(bus: B, config: EncConfig) -> Self {
        Self {
            transport: RegisterTransport::new(bus),
            ring: RxRing::new(0, config.rx_tail_wrap),
            config,
            mac_addr: [0; 6],
            ready: false,
        }
    }

    /// Bring the controller up.
    ///
    /// Any hardware that does not come up (dead SPI link, no stable clock,
    /// reset not taking effect) fails with [`EncError::NotReady`] and leaves
    /// the driver unarmed.
    pub fn init(&mut self) -> Result<()> {
        info!("ENC424J600: Initializing...");
        self.ready = false;
        let timeouts = self.config.timeouts;

        if !self.handshake() {
            error!("ENC424J600: SPI handshake through EUDAST failed");
            return Err(EncError::NotReady);
        }

        self.transport
            .poll_register(
                Register::Estat,
                &timeouts,
                timeouts.clock_ready,
                WaitCondition::ClockReady,
                |estat| Estat::from_bits_retain(estat).contains(Estat::CLKRDY),
            )
            .map_err(|err| {
                error!("ENC424J600: clock never became ready: {}", err);
                EncError::NotReady
            })?;

        self.transport.reset();
        UseKernelFunc::busy_wait(Duration::from_micros(RESET_DELAY_US));

        let eudast = self.transport.read_register(Register::Eudast);
        if eudast != 0 {
            error!("ENC424J600: reset did not clear EUDAST ({:#06x})", eudast);
            return Err(EncError::NotReady);
        }
        // PHY needs at least 256 us after reset
        UseKernelFunc::busy_wait(Duration::from_micros(PHY_START_DELAY_US));

        self.transport
            .write_register(Register::Econ2, self.config.econ2);

        let rx_start = self.transport.read_register(Register::Erxst);
        self.ring = RxRing::new(rx_start, self.config.rx_tail_wrap);
        debug!("ENC424J600: RX ring starts at {:#06x}", rx_start);

        if self.config.reject_broadcast {
            self.transport
                .clear_bits(Register::Erxfcon, Erxfcon::BCEN.bits());
        }
        self.transport.set_bits(Register::Econ1, Econ1::RXEN.bits());

        self.mac_addr = self.read_mac_address();
        info!(
            "ENC424J600: MAC Address: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.mac_addr[0],
            self.mac_addr[1],
            self.mac_addr[2],
            self.mac_addr[3],
            self.mac_addr[4],
            self.mac_addr[5]
        );

        self.ready = true;
        self.enable_interrupts();
        info!("ENC424J600: Initialization complete");
        Ok(())
    }

    /// Write a pattern to EUDAST until it reads back intact
    fn handshake(&mut self) -> bool {
        let timeouts = self.config.timeouts;
        for attempt in 0..timeouts.attempts(timeouts.clock_ready) {
            if attempt > 0 {
                UseKernelFunc::busy_wait(timeouts.poll_interval);
            }
            self.transport
                .write_register(Register::Eudast, HANDSHAKE_PATTERN);
            if self.transport.read_register(Register::Eudast) == HANDSHAKE_PATTERN {
                return true;
            }
        }
        false
    }

    fn read_mac_address(&mut self) -> MacAddress {
        let mut mac = [0u8; 6];
        let regs = [Register::Maadr1, Register::Maadr2, Register::Maadr3];
        for (pair, reg) in mac.chunks_exact_mut(2).zip(regs) {
            pair.copy_from_slice(&self.transport.read_register(reg).to_le_bytes());
        }
        mac
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(EncError::NotReady)
        }
    }

    /// True once [`init`](Self::init) has succeeded
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Station MAC address, as read during init
    pub fn mac_address(&self) -> MacAddress {
        self.mac_addr
    }

    pub fn config(&self) -> &EncConfig {
        &self.config
    }

    /// Address of the next unread packet in the receive ring
    pub fn next_packet_pointer(&self) -> u16 {
        self.ring.next_packet()
    }

    /// Number of packets waiting in the receive ring (ESTAT.PKTCNT)
    pub fn pending_packets(&mut self) -> u8 {
        let estat = self.transport.read_register(Register::Estat);
        (estat & Estat::PKTCNT.bits()) as u8
    }

    /// Enable the interrupt system and the packet received interrupt
    pub fn enable_interrupts(&mut self) {
        self.transport.enable_interrupts(self.config.interrupt_mask);
    }

    /// Disable the interrupt system; the INT line goes inactive
    pub fn disable_interrupts(&mut self) {
        self.transport.disable_interrupts();
    }

    /// Mask chip interrupts until the returned guard is dropped.
    ///
    /// This is the critical section for a receive/send pair issued from
    /// the interrupt handler. Interrupts are re-enabled on every exit path.
    pub fn interrupts_masked(&mut self) -> InterruptGuard<'_, B> {
        self.disable_interrupts();
        InterruptGuard { driver: self }
    }

    pub fn bus(&self) -> &B {
        self.transport.bus()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        self.transport.bus_mut()
    }

    /// Release the SPI bus
    pub fn free(self) -> B {
        self.transport.into_inner()
    }
}

/// Exclusive access to the driver with chip interrupts masked
pub struct InterruptGuard<'a, B: SpiBus> {
    driver: &'a mut Enc424j600<B>,
}

impl<B: SpiBus> Deref for InterruptGuard<'_, B> {
    type Target = Enc424j600<B>;

    fn deref(&self) -> &Self::Target {
        self.driver
    }
}

impl<B: SpiBus> DerefMut for InterruptGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.driver
    }
}

impl<B: SpiBus> Drop for InterruptGuard<'_, B> {
    fn drop(&mut self) {
        // a pending interrupt drives INT active again right away
        if self.driver.ready {
            self.driver.enable_interrupts();
        }
    }
}
