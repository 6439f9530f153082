//! ENC424J600 SPI opcodes and unbanked special function registers

use bitflags::bitflags;

/// Single byte SPI instructions
///
/// The opcode is always the first byte shifted out after chip select.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Read Control Register, Unbanked
    Rcru = 0x20,
    /// Write Control Register, Unbanked
    Wcru = 0x22,
    /// Bit Field Set, Unbanked
    Bfsu = 0x24,
    /// Bit Field Clear, Unbanked
    Bfcu = 0x26,
    /// Write General Purpose Buffer Data
    Wgpdata = 0x2A,
    /// Read Receive Buffer Data
    Rrxdata = 0x2C,
    /// Write General Purpose Buffer Write Pointer
    Wgpwrpt = 0x6C,
    /// System reset
    SetEthRst = 0xCA,
    /// Request packet transmission
    SetTxRts = 0xD4,
    /// Start DMA checksum with the default seed
    DmaCksum = 0xD8,
    /// Disable interrupts (clear EIE.INTIE)
    ClrEie = 0xEE,
}

impl Opcode {
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x20 => Self::Rcru,
            0x22 => Self::Wcru,
            0x24 => Self::Bfsu,
            0x26 => Self::Bfcu,
            0x2A => Self::Wgpdata,
            0x2C => Self::Rrxdata,
            0x6C => Self::Wgpwrpt,
            0xCA => Self::SetEthRst,
            0xD4 => Self::SetTxRts,
            0xD8 => Self::DmaCksum,
            0xEE => Self::ClrEie,
            _ => return None,
        })
    }
}

/// Unbanked 16-bit SFR addresses
///
/// Every register is transferred low byte first on the bus.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Transmit start address
    Etxst = 0x00,
    /// Transmit length
    Etxlen = 0x02,
    /// Receive buffer start address (default 0x5340)
    Erxst = 0x04,
    /// Receive tail pointer (default 0x5ffe)
    Erxtail = 0x06,
    /// DMA start address
    Edmast = 0x0A,
    /// DMA length
    Edmalen = 0x0C,
    /// DMA checksum result
    Edmacs = 0x10,
    /// User-defined area start, used as the init handshake register
    Eudast = 0x16,
    /// Ethernet status
    Estat = 0x1A,
    /// Ethernet control 1
    Econ1 = 0x1E,
    /// Receive filter control
    Erxfcon = 0x34,
    /// MAC address bytes 5..6
    Maadr3 = 0x60,
    /// MAC address bytes 3..4
    Maadr2 = 0x62,
    /// MAC address bytes 1..2
    Maadr1 = 0x64,
    /// Ethernet control 2
    Econ2 = 0x6E,
    /// Interrupt enable
    Eie = 0x72,
    /// General purpose buffer write pointer
    Egpwrpt = 0x88,
    /// Receive buffer read pointer
    Erxrdpt = 0x8A,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// ESTAT bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Estat: u16 {
        /// Clock ready
        const CLKRDY = 0x1000;
        /// Pending packet count (8 bit field)
        const PKTCNT = 0x00ff;
    }
}

bitflags! {
    /// ECON1 bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Econ1: u16 {
        /// Receive enable
        const RXEN = 0x0001;
        /// Transmit request to send
        const TXRTS = 0x0002;
        /// DMA no-checksum (copy only)
        const DMANOCS = 0x0004;
        /// DMA checksum seed select
        const DMACSSD = 0x0008;
        /// DMA copy
        const DMACPY = 0x0010;
        /// DMA start/busy
        const DMAST = 0x0020;
        /// Decrement packet counter
        const PKTDEC = 0x0100;
    }
}

bitflags! {
    /// ECON2 bits used at init
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Econ2: u16 {
        /// Ethernet enable
        const ETHEN = 0x8000;
        /// LED stretching
        const STRCH = 0x4000;
        /// Automatic source MAC insertion on transmit
        const TXMAC = 0x2000;
    }
}

bitflags! {
    /// EIE bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Eie: u16 {
        /// Global interrupt enable
        const INTIE = 0x8000;
        /// Packet received interrupt enable
        const PKTIE = 0x0040;
    }
}

bitflags! {
    /// ERXFCON bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Erxfcon: u16 {
        /// Broadcast collection enable
        const BCEN = 0x0001;
    }
}
