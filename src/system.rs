//! # System control API
//!
//! This module provides the APIs to bring the CC1101 into a known configuration
//! and to control its main state machine outside of a transmission.
//!
//! ## Available Methods
//!
//! ### Configuration
//! - [`init`](Cc1101::init) - Load a complete radio profile (PA table then registers)
//! - [`set_pa_table`](Cc1101::set_pa_table) - Write the PA table
//! - [`wr_config`](Cc1101::wr_config) - Write the register image from offset 0
//!
//! ### State control
//! - [`reset`](Cc1101::reset) - Software reset, all registers back to default
//! - [`set_idle`](Cc1101::set_idle) - Leave RX/TX and go to IDLE
//! - [`get_status`](Cc1101::get_status) - Read the chip status byte
//!
//! The chip applies register values as they are written, no strobe is needed after [`init`](Cc1101::init).
//! Frequency calibration happens on the IDLE to TX transition (per MCSM0 in the profile),
//! so the first transmission after init includes the calibration time.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

use crate::constants::*;
use crate::profile::{PaTable, RadioProfile};
use crate::status::ChipStatus;

use super::{Cc1101, Cc1101Error, TxDone};

impl<O, SPI, W, D> Cc1101<O, SPI, W, D> where
    O: OutputPin, SPI: SpiBus<u8>, W: TxDone, D: DelayNs
{

    /// Load the PA table and all configuration registers.
    /// Must be called before the first transmission.
    pub async fn init(&mut self, profile: &RadioProfile) -> Result<(), Cc1101Error> {
        #[cfg(feature = "defmt")]{defmt::debug!("[INIT] PA {=[u8]:02x}", profile.pa_table().as_bytes());}
        self.set_pa_table(profile.pa_table()).await?;
        self.wr_config(profile.registers()).await
    }

    /// Write the 8 entries of the PA table
    pub async fn set_pa_table(&mut self, pa_table: &PaTable) -> Result<(), Cc1101Error> {
        self.wr_burst(ADDR_PATABLE, pa_table.as_bytes()).await
    }

    /// Write a register image starting at the first configuration register
    pub async fn wr_config(&mut self, regs: &[u8]) -> Result<(), Cc1101Error> {
        self.wr_burst(ADDR_CONFIG, regs).await
    }

    /// Software reset (SRES)
    /// All registers go back to their default, the profile must be loaded again.
    pub async fn reset(&mut self) -> Result<(), Cc1101Error> {
        self.strobe(STROBE_SRES).await?;
        Ok(())
    }

    /// Exit RX/TX and go to IDLE (SIDLE)
    pub async fn set_idle(&mut self) -> Result<(), Cc1101Error> {
        self.strobe(STROBE_SIDLE).await?;
        Ok(())
    }

    /// Read the chip status byte (SNOP)
    pub async fn get_status(&mut self) -> Result<ChipStatus, Cc1101Error> {
        self.strobe(STROBE_SNOP).await
    }
}
