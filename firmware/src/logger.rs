use core::{fmt, fmt::Write};
use log::{Level, Metadata, Record};

use crate::{MAX_LOG_LEVEL, USB_MANAGER};

/// Writes `<level> - <message>` lines to the USB serial port.
pub struct SerialLogger;

impl fmt::Write for SerialLogger {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        cortex_m::interrupt::free(|cs| {
            let mut usb_ref = USB_MANAGER.borrow(cs).borrow_mut();
            if let Some(usb) = usb_ref.as_mut() {
                usb.serial_port_borrow_mut()
                    .write(s.as_bytes())
                    .map_or_else(|_error| Err(fmt::Error), |_c| Ok(()))
            } else {
                Ok(())
            }
        })
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LOG_LEVEL
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut writer = SerialLogger;
            //serial port is probabbly not connected, better to swallow failures than panic
            let _ = write!(
                &mut writer,
                "{} - {}\r\n",
                Self::level_str(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

impl SerialLogger {
    fn level_str(level: Level) -> &'static str {
        match level {
            Level::Error => "E",
            Level::Warn => "W",
            Level::Info => "I",
            Level::Debug => "D",
            Level::Trace => "T",
        }
    }
}
