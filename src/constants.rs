//! Register map subset used by the driver

/// Header flag for a burst write
pub const WRITE_BURST : u8 = 0x40;
/// Header flag for a burst read
pub const READ_BURST  : u8 = 0xC0;
/// Register/strobe address bits of a header byte
pub const ADDR_MASK   : u8 = 0x3F;

/// First configuration register (IOCFG2)
pub const ADDR_CONFIG : u8 = 0x00;
/// GDO0 output pin configuration
pub const ADDR_IOCFG0 : u8 = 0x02;
/// Number of configuration registers written at init (0x00..=0x2E)
pub const CONFIG_LEN  : usize = 47;

/// Reset chip
pub const STROBE_SRES  : u8 = 0x30;
/// Enable TX
pub const STROBE_STX   : u8 = 0x35;
/// Exit RX/TX, turn off frequency synthesizer
pub const STROBE_SIDLE : u8 = 0x36;
/// Flush the TX FIFO
pub const STROBE_SFTX  : u8 = 0x3B;
/// No operation, returns the status byte
pub const STROBE_SNOP  : u8 = 0x3D;

/// Underflow flag and number of bytes in the TX FIFO (status register, burst access only)
pub const ADDR_TXBYTES : u8 = 0x3A;
/// Power amplifier table
pub const ADDR_PATABLE : u8 = 0x3E;
/// TX FIFO (write access)
pub const ADDR_FIFO    : u8 = 0x3F;

/// Number of entries in the PA table
pub const PA_TABLE_LEN : usize = 8;
/// PA table entry for ~10dBm at 433MHz
pub const PA_10DBM_433 : u8 = 0xC0;

/// Largest payload accepted by a single transmit
pub const MAX_PACKET_LEN : usize = 255;
