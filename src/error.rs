//! Driver error types.

pub type Result<T> = core::result::Result<T, EncError>;

/// Status bit a bounded poll was waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// ESTAT.CLKRDY after power-up
    ClockReady,
    /// ECON1.DMAST clearing after a checksum request
    DmaChecksum,
    /// ECON1.TXRTS clearing after a transmit request
    Transmit,
}

impl core::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::ClockReady => "clock ready",
            Self::DmaChecksum => "DMA checksum",
            Self::Transmit => "transmit completion",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncError {
    #[error("controller not ready")]
    NotReady,
    #[error("timed out waiting for {0}")]
    Timeout(WaitCondition),
    #[error("frame does not carry an IPv4 packet")]
    NotIpv4,
    #[error("IPv4 packet does not carry a UDP datagram")]
    NotUdp,
    #[error("UDP payload exceeds the allowed length")]
    OversizePayload,
    #[error("UDP length field shorter than the UDP header")]
    MalformedUdp,
    #[error("IPv4 header length field does not fit the buffer")]
    InvalidHeader,
}

impl EncError {
    /// Decode failures drop a single received frame; the driver stays usable.
    pub const fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Self::NotIpv4 | Self::NotUdp | Self::OversizePayload | Self::MalformedUdp
        )
    }
}
