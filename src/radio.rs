//! # Transmit API
//!
//! - [`transmit`](Cc1101::transmit) - Send one packet and check the TX FIFO was drained
//! - [`set_tx`](Cc1101::set_tx) - Start a transmission (STX)
//! - [`wait_tx_done`](Cc1101::wait_tx_done) - Wait for the end of a transmission, bounded by the TX timeout
//!
//! A transmission is always the same sequence:
//! IDLE strobe, FIFO write, TX strobe, completion wait, TXBYTES read.
//! The profile must have been loaded with [`init`](Cc1101::init) beforehand.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

use crate::constants::*;

use super::{Cc1101, Cc1101Error, TxDone};

impl<O, SPI, W, D> Cc1101<O, SPI, W, D> where
    O: OutputPin, SPI: SpiBus<u8>, W: TxDone, D: DelayNs
{

    /// Start transmitting the content of the TX FIFO (STX)
    pub async fn set_tx(&mut self) -> Result<(), Cc1101Error> {
        self.strobe(STROBE_STX).await?;
        Ok(())
    }

    /// Wait for the end of the current transmission using the completion strategy
    pub async fn wait_tx_done(&mut self) -> Result<(), Cc1101Error> {
        let timeout = self.tx_timeout;
        self.tx_done.wait_done(&mut self.delay, timeout).await
    }

    /// Send a packet of up to 255 bytes.
    /// Returns true when the TX FIFO is empty after the completion wait,
    /// false if some bytes were left behind.
    pub async fn transmit(&mut self, payload: &[u8]) -> Result<bool, Cc1101Error> {
        if payload.len() > MAX_PACKET_LEN {
            return Err(Cc1101Error::InvalidSize);
        }
        #[cfg(feature = "defmt")]{defmt::debug!("[TX] {=[u8]:02x}", payload);}
        // FIFO can only be written outside of TX
        self.set_idle().await?;
        self.wr_tx_fifo(payload).await?;
        self.set_tx().await?;
        self.wait_tx_done().await?;
        let fifo = self.get_tx_fifo_status().await?;
        if !fifo.is_empty() {
            #[cfg(feature = "defmt")]{defmt::warn!("[TX] {} bytes left in FIFO", fifo.remaining());}
        }
        Ok(fifo.is_empty())
    }
}
