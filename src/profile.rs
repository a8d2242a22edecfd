//! # Radio profiles
//!
//! A [`RadioProfile`] is the complete register image written at init: the 47
//! configuration registers starting at IOCFG2 and the 8-entry PA table.
//! The driver treats the register image as an opaque blob, so switching to
//! another carrier, modulation or packet format is a data change:
//! export a new table (for example from SmartRF Studio) and hand it to
//! [`RadioProfile::new`] or [`RadioProfile::from_slice`].
//!
//! Only entry 0 of the PA table is used when PA ramping is off, the other
//! entries are filled with the same value.

use embedded_hal::digital::PinState;

use crate::constants::*;
use crate::Cc1101Error;

/// Power amplifier table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaTable([u8; PA_TABLE_LEN]);

impl PaTable {

    /// Table with every entry set to the same PA setting (fixed output power)
    pub const fn fixed(level: u8) -> Self {
        PaTable([level; PA_TABLE_LEN])
    }

    /// Table from explicit entries (PA ramping / ASK shaping)
    pub const fn from_array(entries: [u8; PA_TABLE_LEN]) -> Self {
        PaTable(entries)
    }

    /// PA setting used for fixed power transmission
    pub fn level(&self) -> u8 {
        self.0[0]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for PaTable {
    fn default() -> Self {
        PaTable::fixed(PA_10DBM_433)
    }
}

/// Register image and PA table applied by [`init`](crate::Cc1101::init)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioProfile {
    regs: [u8; CONFIG_LEN],
    pa_table: PaTable,
}

impl RadioProfile {

    /// 433.92MHz, 2-FSK, 1.2kBaud, 5.16kHz deviation, Manchester,
    /// variable packet length (max 255), CRC enabled, 30/32 sync word bits.
    /// GDO0 asserts when the sync word is sent and deasserts at the end of the packet.
    /// PA set to ~10dBm.
    pub const SMARTRF_433_92_FSK: RadioProfile = RadioProfile::new([
        0x29, // IOCFG2
        0x2E, // IOCFG1
        0x06, // IOCFG0
        0x47, // FIFOTHR
        0xD3, // SYNC1
        0x91, // SYNC0
        0xFF, // PKTLEN
        0x04, // PKTCTRL1
        0x05, // PKTCTRL0
        0x00, // ADDR
        0x00, // CHANNR
        0x06, // FSCTRL1
        0x00, // FSCTRL0
        0x10, // FREQ2
        0xB0, // FREQ1
        0x7E, // FREQ0
        0xF5, // MDMCFG4
        0x83, // MDMCFG3
        0x0B, // MDMCFG2
        0x02, // MDMCFG1
        0xF8, // MDMCFG0
        0x15, // DEVIATN
        0x07, // MCSM2
        0x30, // MCSM1
        0x18, // MCSM0
        0x16, // FOCCFG
        0x6C, // BSCFG
        0x03, // AGCCTRL2
        0x40, // AGCCTRL1
        0x91, // AGCCTRL0
        0x87, // WOREVT1
        0x6B, // WOREVT0
        0xFB, // WORCTRL
        0x56, // FREND1
        0x10, // FREND0
        0xE9, // FSCAL3
        0x2A, // FSCAL2
        0x00, // FSCAL1
        0x1F, // FSCAL0
        0x41, // RCCTRL1
        0x00, // RCCTRL0
        0x59, // FSTEST
        0x7F, // PTEST
        0x3F, // AGCTEST
        0x81, // TEST2
        0x35, // TEST1
        0x09, // TEST0
    ], PaTable::fixed(PA_10DBM_433));

    pub const fn new(regs: [u8; CONFIG_LEN], pa_table: PaTable) -> Self {
        Self { regs, pa_table }
    }

    /// Build a profile from an externally stored register image.
    /// The image must hold exactly one byte per configuration register.
    pub fn from_slice(regs: &[u8], pa_table: PaTable) -> Result<Self, Cc1101Error> {
        let regs: [u8; CONFIG_LEN] = regs.try_into().map_err(|_| Cc1101Error::InvalidSize)?;
        Ok(Self::new(regs, pa_table))
    }

    /// Copy of the profile with a different PA table
    pub fn with_pa_table(&self, pa_table: PaTable) -> Self {
        Self { regs: self.regs, pa_table }
    }

    /// Copy of the profile with one configuration register replaced.
    /// Offsets outside the configuration space are ignored.
    pub fn with_register(&self, offset: u8, value: u8) -> Self {
        let mut regs = self.regs;
        if let Some(r) = regs.get_mut(offset as usize) {
            *r = value;
        }
        Self { regs, pa_table: self.pa_table }
    }

    /// Register image, written from offset 0
    pub fn registers(&self) -> &[u8] {
        &self.regs
    }

    pub fn pa_table(&self) -> &PaTable {
        &self.pa_table
    }

    /// Level of GDO0 outside of a transmission (IOCFG0 bit 6 inverts the output)
    pub fn gdo0_idle_level(&self) -> PinState {
        if self.regs[ADDR_IOCFG0 as usize] & 0x40 != 0 {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl Default for RadioProfile {
    fn default() -> Self {
        RadioProfile::SMARTRF_433_92_FSK
    }
}
