//! # Chip status and TX FIFO status
//!
//! Every header byte sent to the CC1101 is answered with a status byte.
//! It contains:
//! - The chip ready flag (low when the crystal is running)
//! - The main state machine state (Idle, Rx, Tx, calibration, ...)
//! - The number of bytes available in the FIFO addressed by the access
//!
//! The TXBYTES status register gives the number of bytes still waiting in
//! the TX FIFO together with an underflow flag, and is the only readback
//! used to confirm a transmission.

/// Status byte clocked out by the chip during each header byte
///  -   7 CHIP_RDYn
///  - 6:4 State
///  - 3:0 FIFO bytes available
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct ChipStatus(u8);

/// Main radio control state, as reported in the status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipState {
    Idle            = 0,
    Rx              = 1,
    Tx              = 2,
    FstxOn          = 3,
    Calibrate       = 4,
    Settling        = 5,
    RxFifoOverflow  = 6,
    TxFifoUnderflow = 7,
}

impl From<u8> for ChipState {
    fn from(value: u8) -> Self {
        match value & 7 {
            0 => ChipState::Idle,
            1 => ChipState::Rx,
            2 => ChipState::Tx,
            3 => ChipState::FstxOn,
            4 => ChipState::Calibrate,
            5 => ChipState::Settling,
            6 => ChipState::RxFifoOverflow,
            _ => ChipState::TxFifoUnderflow,
        }
    }
}

impl ChipStatus {

    /// Create a status from the raw byte
    pub fn from_byte(byte: u8) -> Self {
        ChipStatus(byte)
    }

    /// Raw status byte
    pub fn value(&self) -> u8 {
        self.0
    }

    /// True when the crystal is running and the chip accepts commands
    pub fn is_ready(&self) -> bool {
        self.0 & 0x80 == 0
    }

    /// Current main state machine state
    pub fn state(&self) -> ChipState {
        (self.0 >> 4).into()
    }

    /// FIFO bytes available (RX FIFO on read access, free TX FIFO bytes on write access), saturates at 15
    pub fn fifo_bytes(&self) -> u8 {
        self.0 & 0x0F
    }
}

impl core::fmt::Debug for ChipStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ChipStatus {{ready: {}, state: {:?}, fifo: {}}}",
            self.is_ready(), self.state(), self.fifo_bytes())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChipStatus {
    fn format(&self, fmt: defmt::Formatter) {
        if !self.is_ready() {
            defmt::write!(fmt, "Chip not ready | ");
        }
        defmt::write!(fmt, "Chip in {} | FIFO {}", self.state(), self.fifo_bytes());
    }
}

/// Content of the TXBYTES status register
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxFifoStatus(u8);

impl TxFifoStatus {

    pub fn from_byte(byte: u8) -> Self {
        TxFifoStatus(byte)
    }

    /// Number of bytes still in the TX FIFO
    pub fn remaining(&self) -> u8 {
        self.0 & 0x7F
    }

    /// TX FIFO underflowed during the last transmission
    pub fn underflow(&self) -> bool {
        self.0 & 0x80 != 0
    }

    /// True when every byte written to the FIFO has been sent
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
