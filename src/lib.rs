#![cfg_attr(not(test), no_std)]

//! Driver for the Microchip ENC424J600/ENC624J600 Ethernet controller
//! attached over SPI, with a minimal manual Ethernet + IPv4 + UDP framer.
//!
//! The UDP checksum is split between software (pseudo-header and UDP
//! header) and the chip's DMA checksum unit (payload already in chip SRAM).

extern crate alloc;

#[macro_use]
extern crate log;

pub mod buffer;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod echo;
pub mod enc424j600;
pub mod error;
pub mod regs;
pub mod transport;
pub mod types;

mod rx;
mod tx;

#[cfg(test)]
mod testing;

pub use config::{EncConfig, Timeouts};
pub use enc424j600::{Enc424j600, InterruptGuard};
pub use error::{EncError, Result, WaitCondition};
pub use transport::SpiBus;
pub use types::{MacAddress, UdpDatagram, UdpEndpoint};

/// Kernel function interface that must be implemented by the platform
///
/// The driver only needs a way to stall the CPU between status polls; all
/// bus timing is owned by the [`SpiBus`] implementation.
#[crate_interface::def_interface]
pub trait KernelFunc {
    /// Busy-wait for the specified duration
    fn busy_wait(duration: core::time::Duration);
}

pub struct UseKernelFunc;

impl KernelFunc for UseKernelFunc {
    #[doc = " Busy-wait for the specified duration"]
    fn busy_wait(duration: core::time::Duration) {
        crate_interface::call_interface!(KernelFunc::busy_wait(duration))
    }
}
