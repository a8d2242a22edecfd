#![cfg_attr(not(test), no_std)]
//! # CC1101 driver
//!
//! Minimal async driver for the TI CC1101 sub-GHz transceiver, covering the
//! transmit path: load a radio profile, then send variable length packets and
//! confirm they left the TX FIFO.
//!
//! The chip is accessed over an SPI bus with a dedicated chip-select pin
//! driven by the driver, and one GDO line used as a transmit completion signal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cc1101::{Cc1101, RadioProfile};
//!
//! let mut radio = Cc1101::new_blocking(spi, nss, gdo0);
//! radio.init(&RadioProfile::default()).await.expect("Init");
//! if radio.transmit(&[0x31, 0x32, 0x33, 0x34]).await.expect("Transmit") {
//!     defmt::info!("Data transmitted");
//! }
//! ```
//!
//! ## Available Methods
//!
//! ### Register access
//! - [`strobe`](Cc1101::strobe) - Send a command strobe
//! - [`wr_burst`](Cc1101::wr_burst) - Write consecutive registers or the TX FIFO
//! - [`rd_burst`](Cc1101::rd_burst) - Read consecutive registers or a status register
//!
//! ### System (see [`system`])
//! - [`init`](Cc1101::init), [`reset`](Cc1101::reset), [`set_idle`](Cc1101::set_idle), [`get_status`](Cc1101::get_status)
//!
//! ### FIFO (see [`fifo`])
//! - [`wr_tx_fifo`](Cc1101::wr_tx_fifo), [`get_tx_fifo_status`](Cc1101::get_tx_fifo_status), [`clear_tx_fifo`](Cc1101::clear_tx_fifo)
//!
//! ### Radio (see [`radio`])
//! - [`transmit`](Cc1101::transmit), [`set_tx`](Cc1101::set_tx), [`wait_tx_done`](Cc1101::wait_tx_done)
//!
//! ## Completion detection
//!
//! The end of a transmission is detected by a [`TxDone`] strategy:
//! - [`GdoBlocking`]: poll the GDO line at a fixed interval
//! - [`GdoAsync`]: wait for an edge on the GDO line
//! - [`FixedDelay`]: sleep a fixed time and let the TX FIFO status decide
//!
//! Waits on the GDO line are bounded by the transmit timeout and fail with [`Cc1101Error::Timeout`].

pub mod constants;
pub mod status;
pub mod profile;
pub mod system;
pub mod fifo;
pub mod radio;

#[cfg(test)]
mod mock;

use embassy_futures::select::{select, Either};
use embassy_time::{Delay, Duration};
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal_async::{delay::DelayNs, digital::Wait, spi::SpiBus};

use constants::{ADDR_MASK, READ_BURST, WRITE_BURST};
use status::ChipStatus;

pub use profile::{PaTable, RadioProfile};
pub use status::{ChipState, TxFifoStatus};

/// Default bound on the wait for the end of a transmission
pub const DEFAULT_TX_TIMEOUT : Duration = Duration::from_secs(2);
/// Default interval between two reads of a polled GDO line
pub const GDO_POLL_INTERVAL : Duration = Duration::from_micros(100);
/// Default sleep used by the fixed delay strategy
pub const DEFAULT_TX_DELAY : Duration = Duration::from_secs(2);

/// Error using the CC1101
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cc1101Error {
    /// Unable to Set/Get a pin level
    Pin,
    /// Unable to use SPI
    Spi,
    /// Timeout while waiting for the end of a transmission
    Timeout,
    /// Payload or register image with invalid size
    InvalidSize,
}

/// Kind of bus access, encoded in the two MSB of the header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Command strobe, no data phase
    Strobe,
    /// Burst write starting at the addressed register
    BurstWrite,
    /// Burst read starting at the addressed register
    BurstRead,
}

impl Access {

    /// Mode bits OR'd into the header
    pub const fn flag(self) -> u8 {
        match self {
            Access::Strobe     => 0,
            Access::BurstWrite => WRITE_BURST,
            Access::BurstRead  => READ_BURST,
        }
    }

    /// Header byte for an access to `addr`. Address bits above 0x3F are dropped.
    pub const fn header(self, addr: u8) -> u8 {
        (addr & ADDR_MASK) | self.flag()
    }
}

fn as_us(d: Duration) -> u32 {
    d.as_micros().min(u32::MAX as u64) as u32
}

fn pin_state<I: InputPin>(pin: &mut I) -> Result<PinState, Cc1101Error> {
    let high = pin.is_high().map_err(|_| Cc1101Error::Pin)?;
    Ok(PinState::from(high))
}

fn busy_level(idle: PinState) -> PinState {
    !idle
}

/// Strategy used to detect the end of a transmission
pub trait TxDone {
    /// Wait until the chip is done transmitting, or fail after `timeout`
    #[allow(async_fn_in_trait)]
    async fn wait_done<D: DelayNs>(&mut self, delay: &mut D, timeout: Duration) -> Result<(), Cc1101Error>;
}

/// GDO line read by polling
pub struct GdoBlocking<I> {
    pin: I,
    idle: PinState,
    interval: Duration,
    assert_wait: bool,
}

impl<I: InputPin> GdoBlocking<I> {

    /// Poll `pin` every [`GDO_POLL_INTERVAL`] until it goes high then low
    pub fn new(pin: I) -> Self {
        Self { pin, idle: PinState::Low, interval: GDO_POLL_INTERVAL, assert_wait: true }
    }

    /// Poll `pin` using the GDO0 idle level of `profile`
    pub fn for_profile(pin: I, profile: &RadioProfile) -> Self {
        Self::new(pin).with_idle_level(profile.gdo0_idle_level())
    }

    /// Level of the line when no transmission is ongoing
    pub fn with_idle_level(self, idle: PinState) -> Self {
        Self { idle, ..self }
    }

    /// Interval between two reads of the line
    pub fn with_poll_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    /// Wait for the line to leave the idle level before waiting for it to come back (default).
    /// Disable only if the line asserts before the first poll after STX.
    pub fn with_assert_wait(self, assert_wait: bool) -> Self {
        Self { assert_wait, ..self }
    }

    /// Read the line and compare to the idle level
    pub fn is_idle(&mut self) -> Result<bool, Cc1101Error> {
        Ok(pin_state(&mut self.pin)? == self.idle)
    }

    /// Poll the line until it reaches `level`.
    /// The number of polls is bounded by `timeout / interval`.
    pub async fn wait_for_level<D: DelayNs>(&mut self, level: PinState, delay: &mut D, timeout: Duration) -> Result<(), Cc1101Error> {
        let mut budget = self.poll_budget(timeout);
        self.poll_until(level, delay, &mut budget).await
    }

    fn poll_budget(&self, timeout: Duration) -> u64 {
        timeout.as_micros().div_ceil(self.interval.as_micros().max(1))
    }

    /// Poll until `level`, each sleep taken from `budget`
    async fn poll_until<D: DelayNs>(&mut self, level: PinState, delay: &mut D, budget: &mut u64) -> Result<(), Cc1101Error> {
        let interval = as_us(self.interval).max(1);
        loop {
            if pin_state(&mut self.pin)? == level {
                return Ok(());
            }
            if *budget == 0 {
                return Err(Cc1101Error::Timeout);
            }
            delay.delay_us(interval).await;
            *budget -= 1;
        }
    }

    pub fn release(self) -> I {
        self.pin
    }
}

impl<I: InputPin> TxDone for GdoBlocking<I> {
    async fn wait_done<D: DelayNs>(&mut self, delay: &mut D, timeout: Duration) -> Result<(), Cc1101Error> {
        // Both phases share one budget
        let mut budget = self.poll_budget(timeout);
        if self.assert_wait {
            self.poll_until(busy_level(self.idle), delay, &mut budget).await?;
        }
        self.poll_until(self.idle, delay, &mut budget).await
    }
}

/// Wait for `pin` to reach `level`, reading it first
async fn wait_level<I: InputPin + Wait>(pin: &mut I, level: PinState) -> Result<(), Cc1101Error> {
    if pin_state(pin)? == level {
        return Ok(());
    }
    let res = match level {
        PinState::Low  => pin.wait_for_low().await,
        PinState::High => pin.wait_for_high().await,
    };
    res.map_err(|_| Cc1101Error::Pin)
}

/// GDO line with edge detection
pub struct GdoAsync<I> {
    pin: I,
    idle: PinState,
    assert_wait: bool,
}

impl<I: InputPin + Wait> GdoAsync<I> {

    /// Wait for `pin` to go high then low
    pub fn new(pin: I) -> Self {
        Self { pin, idle: PinState::Low, assert_wait: true }
    }

    /// Wait on `pin` using the GDO0 idle level of `profile`
    pub fn for_profile(pin: I, profile: &RadioProfile) -> Self {
        Self::new(pin).with_idle_level(profile.gdo0_idle_level())
    }

    /// Level of the line when no transmission is ongoing
    pub fn with_idle_level(self, idle: PinState) -> Self {
        Self { idle, ..self }
    }

    /// Wait for the line to leave the idle level before waiting for it to come back (default).
    /// Disable only if the line asserts before it is first read after STX.
    pub fn with_assert_wait(self, assert_wait: bool) -> Self {
        Self { assert_wait, ..self }
    }

    /// Read the line and compare to the idle level
    pub fn is_idle(&mut self) -> Result<bool, Cc1101Error> {
        Ok(pin_state(&mut self.pin)? == self.idle)
    }

    /// Wait for the line to reach `level` (if not already), racing against `timeout`
    pub async fn wait_for_level<D: DelayNs>(&mut self, level: PinState, delay: &mut D, timeout: Duration) -> Result<(), Cc1101Error> {
        match select(wait_level(&mut self.pin, level), delay.delay_us(as_us(timeout))).await {
            Either::First(res) => res,
            Either::Second(_) => Err(Cc1101Error::Timeout),
        }
    }

    pub fn release(self) -> I {
        self.pin
    }
}

impl<I: InputPin + Wait> TxDone for GdoAsync<I> {
    async fn wait_done<D: DelayNs>(&mut self, delay: &mut D, timeout: Duration) -> Result<(), Cc1101Error> {
        let idle = self.idle;
        let assert_wait = self.assert_wait;
        let pin = &mut self.pin;
        // Both phases race the same deadline
        let levels = async move {
            if assert_wait {
                wait_level(pin, busy_level(idle)).await?;
            }
            wait_level(pin, idle).await
        };
        match select(levels, delay.delay_us(as_us(timeout))).await {
            Either::First(res) => res,
            Either::Second(_) => Err(Cc1101Error::Timeout),
        }
    }
}

/// No completion line: sleep for a fixed time.
/// Never times out, the TX FIFO status read afterwards tells if the packet was sent.
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_TX_DELAY)
    }
}

impl TxDone for FixedDelay {
    async fn wait_done<D: DelayNs>(&mut self, delay: &mut D, _timeout: Duration) -> Result<(), Cc1101Error> {
        delay.delay_us(as_us(self.delay)).await;
        Ok(())
    }
}

/// CC1101 Device
pub struct Cc1101<O, SPI, W, D = Delay> {
    /// SPI bus
    spi: SPI,
    /// Chip select (active low)
    nss: O,
    /// End of transmission detection
    tx_done: W,
    /// Delay provider used by the completion strategy
    delay: D,
    /// Bound on the completion wait
    tx_timeout: Duration,
    /// Status byte received with the last header
    status: ChipStatus,
}

// Create driver with a GDO line not implementing wait
impl<I, O, SPI> Cc1101<O, SPI, GdoBlocking<I>, Delay> where
    I: InputPin, O: OutputPin, SPI: SpiBus<u8>
{
    /// Create a CC1101 Device polling GDO0 for the end of transmissions
    pub fn new_blocking(spi: SPI, nss: O, gdo0: I) -> Self {
        Self::new_with(spi, nss, GdoBlocking::new(gdo0), Delay)
    }
}

// Create driver with a GDO line implementing wait
impl<I, O, SPI> Cc1101<O, SPI, GdoAsync<I>, Delay> where
    I: InputPin + Wait, O: OutputPin, SPI: SpiBus<u8>
{
    /// Create a CC1101 Device waiting for an edge on GDO0 at the end of transmissions
    pub fn new(spi: SPI, nss: O, gdo0: I) -> Self {
        Self::new_with(spi, nss, GdoAsync::new(gdo0), Delay)
    }
}

// Create driver without completion line
impl<O, SPI> Cc1101<O, SPI, FixedDelay, Delay> where
    O: OutputPin, SPI: SpiBus<u8>
{
    /// Create a CC1101 Device sleeping `tx_delay` after starting a transmission
    pub fn new_fixed_delay(spi: SPI, nss: O, tx_delay: Duration) -> Self {
        Self::new_with(spi, nss, FixedDelay::new(tx_delay), Delay)
    }
}

impl<O, SPI, W, D> Cc1101<O, SPI, W, D> where
    O: OutputPin, SPI: SpiBus<u8>, W: TxDone, D: DelayNs
{

    /// Create a CC1101 Device with an explicit completion strategy and delay provider
    pub fn new_with(spi: SPI, nss: O, tx_done: W, delay: D) -> Self {
        Self { spi, nss, tx_done, delay, tx_timeout: DEFAULT_TX_TIMEOUT, status: ChipStatus::default() }
    }

    /// Give back the bus, chip select, completion strategy and delay provider
    pub fn release(self) -> (SPI, O, W, D) {
        (self.spi, self.nss, self.tx_done, self.delay)
    }

    /// Status byte received with the last access
    pub fn status(&self) -> ChipStatus {
        self.status
    }

    /// Bound on the wait for the end of a transmission
    pub fn tx_timeout(&self) -> Duration {
        self.tx_timeout
    }

    pub fn set_tx_timeout(&mut self, timeout: Duration) {
        self.tx_timeout = timeout;
    }

    /// Access to the completion strategy (e.g. to check the GDO line)
    pub fn tx_done_mut(&mut self) -> &mut W {
        &mut self.tx_done
    }

    /// Assert chip select
    fn begin(&mut self) -> Result<(), Cc1101Error> {
        self.nss.set_low().map_err(|_| Cc1101Error::Pin)
    }

    /// Flush the bus and release chip select, whatever the outcome of the access.
    /// The first error encountered is returned.
    async fn end(&mut self, res: Result<(), Cc1101Error>) -> Result<(), Cc1101Error> {
        let flushed = self.spi.flush().await.map_err(|_| Cc1101Error::Spi);
        let released = self.nss.set_high().map_err(|_| Cc1101Error::Pin);
        res.and(flushed).and(released)
    }

    /// Send the header byte and save the status byte received in exchange
    async fn header(&mut self, access: Access, addr: u8) -> Result<(), Cc1101Error> {
        let mut hdr = [access.header(addr)];
        self.spi
            .transfer_in_place(&mut hdr).await
            .map_err(|_| Cc1101Error::Spi)?;
        self.status = ChipStatus::from_byte(hdr[0]);
        Ok(())
    }

    /// Send a command strobe
    pub async fn strobe(&mut self, addr: u8) -> Result<ChipStatus, Cc1101Error> {
        self.begin()?;
        let res = self.header(Access::Strobe, addr).await;
        self.end(res).await?;
        Ok(self.status)
    }

    /// Write `data` to consecutive registers starting at `addr`.
    /// Addressing the FIFO pushes every byte to the TX FIFO.
    pub async fn wr_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), Cc1101Error> {
        self.begin()?;
        let res = async {
            self.header(Access::BurstWrite, addr).await?;
            if !data.is_empty() {
                self.spi
                    .write(data).await
                    .map_err(|_| Cc1101Error::Spi)?;
            }
            Ok::<(), Cc1101Error>(())
        }.await;
        self.end(res).await
    }

    /// Read consecutive registers starting at `addr` into `data`.
    /// Addresses 0x30-0x3D select the status registers.
    pub async fn rd_burst(&mut self, addr: u8, data: &mut [u8]) -> Result<(), Cc1101Error> {
        self.begin()?;
        let res = async {
            self.header(Access::BurstRead, addr).await?;
            if !data.is_empty() {
                self.spi
                    .read(data).await
                    .map_err(|_| Cc1101Error::Spi)?;
            }
            Ok::<(), Cc1101Error>(())
        }.await;
        self.end(res).await
    }
}
