//! Display Sink - writes a frame to the 20x4 character display
//!
//! The real device is an HD44780 panel behind a PCF8574 I2C backpack on
//! the Pi's i2c-dev bus. A console sink stands in on development boxes.

use crate::frame::DisplayFrame;
use anyhow::Result;

/// Something that can show text on numbered rows. Rows are 1-based, 1..=4.
pub trait DisplaySink {
    fn display_string(&mut self, text: &str, row: u8) -> Result<()>;
    fn set_backlight(&mut self, on: bool) -> Result<()>;
}

/// Write the frame's four lines to rows 1..=4, in order. A write failure
/// is fatal for the agent and propagates.
pub fn render(sink: &mut dyn DisplaySink, frame: &DisplayFrame) -> Result<()> {
    for (i, line) in frame.lines().iter().enumerate() {
        sink.display_string(line, i as u8 + 1)?;
    }
    Ok(())
}

/// Renders to stdout, for `--console` runs
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn display_string(&mut self, text: &str, row: u8) -> Result<()> {
        println!("{}| {}", row, text);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        tracing::info!("backlight {}", if on { "on" } else { "off" });
        Ok(())
    }
}

#[cfg(feature = "lcd")]
pub use lcd::I2cLcd;

#[cfg(feature = "lcd")]
mod lcd {
    use super::DisplaySink;
    use anyhow::{anyhow, Context, Result};
    use embedded_hal::i2c::I2c;
    use linux_embedded_hal::I2cdev;
    use std::thread::sleep;
    use std::time::Duration;

    const LCD_WIDTH: usize = 20;

    // PCF8574 bit layout: P0=RS, P2=EN, P3=backlight, P4..P7=data nibble
    const REGISTER_SELECT: u8 = 0x01;
    const ENABLE: u8 = 0x04;
    const BACKLIGHT: u8 = 0x08;

    // DDRAM start address per row on a 20x4 panel
    const ROW_OFFSETS: [u8; 4] = [0x80, 0xC0, 0x94, 0xD4];

    /// HD44780 20x4 LCD on a PCF8574 I2C backpack
    pub struct I2cLcd {
        i2c: I2cdev,
        address: u8,
        backlight: u8,
    }

    impl I2cLcd {
        /// Open the bus and run the 4-bit init sequence
        pub fn open(bus: &str, address: u8) -> Result<Self> {
            let i2c = I2cdev::new(bus).with_context(|| format!("open I2C bus {}", bus))?;
            let mut lcd = Self {
                i2c,
                address,
                backlight: BACKLIGHT,
            };
            lcd.init()?;
            Ok(lcd)
        }

        fn init(&mut self) -> Result<()> {
            self.command(0x03)?;
            self.command(0x02)?; // drop to 4-bit mode
            self.command(0x28)?; // function set: 4-bit, 2-line, 5x8 font
            self.command(0x0C)?; // display on, cursor off
            self.command(0x01)?; // clear
            self.command(0x06)?; // entry mode: left to right
            sleep(Duration::from_millis(200));
            Ok(())
        }

        fn command(&mut self, cmd: u8) -> Result<()> {
            self.write_byte(cmd, 0)
        }

        fn write_byte(&mut self, value: u8, mode: u8) -> Result<()> {
            self.write_nibble(mode | (value & 0xF0))?;
            self.write_nibble(mode | ((value << 4) & 0xF0))
        }

        fn write_nibble(&mut self, data: u8) -> Result<()> {
            let data = data | self.backlight;
            self.raw_write(data)?;
            // strobe EN to latch the nibble
            self.raw_write(data | ENABLE)?;
            sleep(Duration::from_micros(500));
            self.raw_write(data & !ENABLE)?;
            sleep(Duration::from_micros(100));
            Ok(())
        }

        fn raw_write(&mut self, byte: u8) -> Result<()> {
            self.i2c
                .write(self.address, &[byte])
                .map_err(|e| anyhow!("I2C write to 0x{:02x} failed: {:?}", self.address, e))
        }
    }

    impl DisplaySink for I2cLcd {
        fn display_string(&mut self, text: &str, row: u8) -> Result<()> {
            if !(1..=4).contains(&row) {
                return Err(anyhow!("display row {} out of range 1..=4", row));
            }

            self.command(ROW_OFFSETS[(row - 1) as usize])?;
            for c in text.chars().take(LCD_WIDTH) {
                self.write_byte(encode_char(c), REGISTER_SELECT)?;
            }
            Ok(())
        }

        fn set_backlight(&mut self, on: bool) -> Result<()> {
            self.backlight = if on { BACKLIGHT } else { 0 };
            self.raw_write(self.backlight)
        }
    }

    /// Map a char onto the HD44780 A00 character ROM
    fn encode_char(c: char) -> u8 {
        match c {
            '\u{00b0}' => 0xDF, // degree glyph
            c if c.is_ascii() => c as u8,
            _ => b'?',
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_encode_degree_symbol() {
            assert_eq!(encode_char('\u{00b0}'), 0xDF);
        }

        #[test]
        fn test_encode_ascii_passthrough() {
            assert_eq!(encode_char('T'), b'T');
            assert_eq!(encode_char(' '), b' ');
        }

        #[test]
        fn test_encode_unknown_char() {
            assert_eq!(encode_char('☃'), b'?');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorReading;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(u8, String)>,
    }

    impl DisplaySink for RecordingSink {
        fn display_string(&mut self, text: &str, row: u8) -> Result<()> {
            self.writes.push((row, text.to_string()));
            Ok(())
        }

        fn set_backlight(&mut self, _on: bool) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_writes_rows_in_order() {
        let frame = DisplayFrame::data(&SensorReading {
            time: 1700000000,
            temp: 21.34,
            humi: 55.68,
            pres: 101325.0,
        });

        let mut sink = RecordingSink::default();
        render(&mut sink, &frame).unwrap();

        let rows: Vec<u8> = sink.writes.iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![1, 2, 3, 4]);
        assert_eq!(sink.writes[3].1, "Pressure: 1013.25hPa");
    }
}
