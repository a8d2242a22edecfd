//! # TX FIFO handling API
//!
//! - [`wr_tx_fifo`](Cc1101::wr_tx_fifo) - Write data to the TX FIFO
//! - [`get_tx_fifo_status`](Cc1101::get_tx_fifo_status) - Number of bytes left in the TX FIFO and underflow flag
//! - [`clear_tx_fifo`](Cc1101::clear_tx_fifo) - Flush the TX FIFO
//!
//! In variable length mode the first byte written to the FIFO is sent as the length field,
//! the driver writes the data as given.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

use crate::constants::*;
use crate::status::TxFifoStatus;

use super::{Cc1101, Cc1101Error, TxDone};

impl<O, SPI, W, D> Cc1101<O, SPI, W, D> where
    O: OutputPin, SPI: SpiBus<u8>, W: TxDone, D: DelayNs
{

    /// Write data to the TX FIFO.
    /// The chip must not be transmitting (see [`set_idle`](Cc1101::set_idle)).
    pub async fn wr_tx_fifo(&mut self, data: &[u8]) -> Result<(), Cc1101Error> {
        self.wr_burst(ADDR_FIFO, data).await
    }

    /// Read the TXBYTES status register
    pub async fn get_tx_fifo_status(&mut self) -> Result<TxFifoStatus, Cc1101Error> {
        let mut rsp = [0u8];
        self.rd_burst(ADDR_TXBYTES, &mut rsp).await?;
        Ok(TxFifoStatus::from_byte(rsp[0]))
    }

    /// Flush the TX FIFO (SFTX).
    /// Only valid in IDLE or after a TX FIFO underflow.
    pub async fn clear_tx_fifo(&mut self) -> Result<(), Cc1101Error> {
        self.strobe(STROBE_SFTX).await?;
        Ok(())
    }
}
