//! Test doubles recording every bus and pin access in one shared trace

use std::{cell::{Cell, RefCell}, collections::VecDeque, rc::Rc};

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi;
use embedded_hal_async::{delay::DelayNs, digital::Wait, spi::SpiBus};

use crate::{Cc1101, GdoBlocking};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CsLow,
    CsHigh,
    /// Single byte exchange (header)
    Header(u8),
    Write(Vec<u8>),
    Read(usize),
    Flush,
    /// Level read on the GDO line
    Gdo(bool),
}

/// One chip-select window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: u8,
    pub written: Vec<u8>,
    pub read: usize,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    miso: VecDeque<u8>,
    status_byte: u8,
    spi_ops: usize,
    fail_spi_op: Option<usize>,
    fail_cs: bool,
    fail_gdo_from: Option<usize>,
}

/// Shared trace of a fake bus, chip select and GDO line
#[derive(Clone, Default)]
pub struct Bus(Rc<RefCell<State>>);

impl Bus {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// Status byte answered to every header
    pub fn set_status_byte(&self, byte: u8) {
        self.0.borrow_mut().status_byte = byte;
    }

    /// Bytes returned by the next reads
    pub fn push_miso(&self, bytes: &[u8]) {
        self.0.borrow_mut().miso.extend(bytes);
    }

    /// Make the n-th SPI exchange (0-based, flush excluded) fail
    pub fn fail_spi_op(&self, n: usize) {
        self.0.borrow_mut().fail_spi_op = Some(n);
    }

    pub fn fail_cs(&self) {
        self.0.borrow_mut().fail_cs = true;
    }

    /// Make every GDO access fail once `n` levels have been read
    pub fn fail_gdo_from(&self, n: usize) {
        self.0.borrow_mut().fail_gdo_from = Some(n);
    }

    /// Chip select is high after the last access
    pub fn cs_released(&self) -> bool {
        let st = self.0.borrow();
        st.events.iter().rev()
            .find(|e| matches!(e, Event::CsLow | Event::CsHigh))
            .map_or(true, |e| *e == Event::CsHigh)
    }

    pub fn gdo_reads(&self) -> usize {
        self.0.borrow().events.iter().filter(|e| matches!(e, Event::Gdo(_))).count()
    }

    /// Group the exchanges by chip-select window.
    /// Panics if an exchange happens outside of a window or windows are nested.
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut current: Option<Frame> = None;
        for ev in self.events() {
            match ev {
                Event::CsLow => {
                    assert!(current.is_none(), "chip select asserted twice");
                    current = Some(Frame { header: 0, written: vec![], read: 0 });
                }
                Event::CsHigh => frames.push(current.take().expect("chip select released twice")),
                Event::Header(b) => current.as_mut().expect("header outside of chip select").header = b,
                Event::Write(data) => current.as_mut().expect("write outside of chip select").written.extend(data),
                Event::Read(n) => current.as_mut().expect("read outside of chip select").read += n,
                Event::Flush | Event::Gdo(_) => {}
            }
        }
        assert!(current.is_none(), "chip select left asserted");
        frames
    }

    fn push(&self, ev: Event) {
        self.0.borrow_mut().events.push(ev);
    }

    fn spi_op(&self) -> Result<(), spi::ErrorKind> {
        let mut st = self.0.borrow_mut();
        let n = st.spi_ops;
        st.spi_ops += 1;
        if st.fail_spi_op == Some(n) {
            Err(spi::ErrorKind::Other)
        } else {
            Ok(())
        }
    }
}

pub struct FakeSpi(Bus);

impl FakeSpi {
    pub fn new(bus: &Bus) -> Self {
        Self(bus.clone())
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = spi::ErrorKind;
}

impl SpiBus<u8> for FakeSpi {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.0.spi_op()?;
        {
            let mut st = self.0.0.borrow_mut();
            for w in words.iter_mut() {
                *w = st.miso.pop_front().unwrap_or(0);
            }
        }
        self.0.push(Event::Read(words.len()));
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.0.spi_op()?;
        self.0.push(Event::Write(words.to_vec()));
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.0.spi_op()?;
        self.0.push(Event::Write(write.to_vec()));
        let status = self.0.0.borrow().status_byte;
        read.fill(status);
        Ok(())
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.0.spi_op()?;
        match words {
            [b] => self.0.push(Event::Header(*b)),
            _ => self.0.push(Event::Write(words.to_vec())),
        }
        let status = self.0.0.borrow().status_byte;
        words.fill(status);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.push(Event::Flush);
        Ok(())
    }
}

pub struct FakeNss(Bus);

impl FakeNss {
    pub fn new(bus: &Bus) -> Self {
        Self(bus.clone())
    }
}

impl digital::ErrorType for FakeNss {
    type Error = digital::ErrorKind;
}

impl OutputPin for FakeNss {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.0.0.borrow().fail_cs {
            return Err(digital::ErrorKind::Other);
        }
        self.0.push(Event::CsLow);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.0.0.borrow().fail_cs {
            return Err(digital::ErrorKind::Other);
        }
        self.0.push(Event::CsHigh);
        Ok(())
    }
}

/// GDO line replaying a list of levels (true = high), the last one repeating forever
pub struct FakeGdo {
    bus: Bus,
    levels: VecDeque<bool>,
    last: bool,
}

impl FakeGdo {
    pub fn new(bus: &Bus, levels: &[bool]) -> Self {
        Self { bus: bus.clone(), levels: levels.iter().copied().collect(), last: false }
    }

    fn check(&self) -> Result<(), digital::ErrorKind> {
        let from = self.bus.0.borrow().fail_gdo_from;
        match from {
            Some(n) if self.bus.gdo_reads() >= n => Err(digital::ErrorKind::Other),
            _ => Ok(()),
        }
    }

    fn next_level(&mut self) -> Result<bool, digital::ErrorKind> {
        self.check()?;
        if let Some(l) = self.levels.pop_front() {
            self.last = l;
        }
        self.bus.push(Event::Gdo(self.last));
        Ok(self.last)
    }

    async fn wait_for(&mut self, high: bool) -> Result<(), digital::ErrorKind> {
        self.check()?;
        while !self.levels.is_empty() {
            if self.next_level()? == high {
                return Ok(());
            }
        }
        if self.last == high {
            Ok(())
        } else {
            core::future::pending().await
        }
    }
}

impl digital::ErrorType for FakeGdo {
    type Error = digital::ErrorKind;
}

impl InputPin for FakeGdo {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.next_level()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.next_level()?)
    }
}

impl Wait for FakeGdo {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.wait_for(true).await
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.wait_for(false).await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.wait_for(false).await?;
        self.wait_for(true).await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.wait_for(true).await?;
        self.wait_for(false).await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        let start = self.last;
        self.wait_for(!start).await
    }
}

/// Delay returning immediately, accumulating the requested time
#[derive(Clone, Default)]
pub struct FakeDelay(Rc<Cell<u64>>);

impl FakeDelay {
    pub fn total_us(&self) -> u64 {
        self.0.get() / 1000
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + ns as u64);
    }

    async fn delay_us(&mut self, us: u32) {
        self.0.set(self.0.get() + us as u64 * 1000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + ms as u64 * 1_000_000);
    }
}

pub type FakeDevice = Cc1101<FakeNss, FakeSpi, GdoBlocking<FakeGdo>, FakeDelay>;

/// Device polling a GDO line replaying `gdo_levels`
pub fn fake_device(gdo_levels: &[bool]) -> (FakeDevice, Bus) {
    let bus = Bus::default();
    let dev = Cc1101::new_with(
        FakeSpi::new(&bus),
        FakeNss::new(&bus),
        GdoBlocking::new(FakeGdo::new(&bus, gdo_levels)),
        FakeDelay::default(),
    );
    (dev, bus)
}
