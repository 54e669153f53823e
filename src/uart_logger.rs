//! Log drain to the serial console.
//!
//! Entries queued by the audio path are formatted and written from the
//! main loop, after the tick, where blocking on the UART is harmless.
//!
//! Line format: `[timestamp_us] LEVEL tag: message\n`

use crate::logging::{LogEntry, LogStream, SliceWriter};

/// Longest formatted line (timestamp, level, tag, message, newline).
pub const LINE_CAPACITY: usize = 160;

/// UART configuration for the console and log output.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            tx_pin: 43,
            rx_pin: 44,
        }
    }
}

/// Format one entry. Returns the number of bytes written to `buf`.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = SliceWriter::new(buf);
    let _ = write!(
        writer,
        "[{:10}] {} {}: {}\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.tag,
        entry.message()
    );
    writer.len()
}

/// Drain every queued entry into `emit`, followed by a drop report if
/// entries were lost since the last drain.
///
/// Returns the number of entries written.
pub fn drain_into<const N: usize>(stream: &LogStream<N>, mut emit: impl FnMut(&[u8])) -> usize {
    use core::fmt::Write;

    let mut line = [0u8; LINE_CAPACITY];
    let mut written = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut line);
        emit(&line[..len]);
        written += 1;
    }

    let dropped = stream.take_dropped();
    if dropped > 0 {
        let mut writer = SliceWriter::new(&mut line);
        let _ = write!(writer, "[WARN] log: dropped {} entries\n", dropped);
        let len = writer.len();
        emit(&line[..len]);
    }

    written
}

/// Drain into any text sink (host console, test buffer).
pub fn drain_to_writer<const N: usize>(stream: &LogStream<N>, out: &mut dyn core::fmt::Write) -> usize {
    drain_into(stream, |line| {
        // A full line buffer may cut the last character
        let text = match core::str::from_utf8(line) {
            Ok(text) => text,
            Err(err) => core::str::from_utf8(&line[..err.valid_up_to()]).unwrap_or(""),
        };
        let _ = out.write_str(text);
    })
}

#[cfg(target_os = "espidf")]
pub use target::*;

#[cfg(target_os = "espidf")]
mod target {
    use esp_idf_svc::hal::delay::NON_BLOCK;
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::uart::{self, Uart, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use super::{drain_into, UartLoggerConfig};
    use crate::logging::LogStream;

    /// Full-duplex UART for log output and console input.
    pub fn init_uart_logger<'d, U: Uart>(
        uart: impl Peripheral<P = U> + 'd,
        tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
        rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'd,
        config: &UartLoggerConfig,
    ) -> Result<UartDriver<'d>, EspError> {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

        UartDriver::new(
            uart,
            tx_pin,
            rx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )
    }

    /// Write all pending entries to the UART.
    pub fn write_pending(uart: &UartDriver<'_>, stream: &LogStream) -> usize {
        drain_into(stream, |line| {
            let _ = uart.write(line);
        })
    }

    /// Read one console byte without blocking.
    pub fn read_byte(uart: &UartDriver<'_>) -> Option<u8> {
        let mut byte = [0u8; 1];
        match uart.read(&mut byte, NON_BLOCK) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    fn entry(level: LogLevel, tag: &'static str, text: &[u8]) -> LogEntry {
        let mut e = LogEntry {
            timestamp_us: 1234567,
            level,
            tag,
            ..LogEntry::default()
        };
        e.msg[..text.len()].copy_from_slice(text);
        e.len = text.len() as u8;
        e
    }

    #[test]
    fn test_format_log_entry() {
        let mut buf = [0u8; LINE_CAPACITY];
        let len = format_log_entry(&entry(LogLevel::Info, "tone", b"start 425 Hz"), &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(formatted, "[   1234567] INFO tone: start 425 Hz\n");
    }

    #[test]
    fn test_format_uses_len_only() {
        let mut e = entry(LogLevel::Error, "router", b"TEST12345X");
        e.len = 5;

        let mut buf = [0u8; LINE_CAPACITY];
        let len = format_log_entry(&e, &mut buf);
        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(formatted.contains("ERROR router: TEST1\n"));
        assert!(!formatted.contains('X'));
    }

    #[test]
    fn test_drain_reports_drops() {
        let stream = LogStream::<2>::new();
        assert!(stream.push(1, LogLevel::Warn, "router", b"a"));
        assert!(stream.push(2, LogLevel::Warn, "router", b"b"));
        assert!(!stream.push(3, LogLevel::Warn, "router", b"c"));

        let mut lines = std::vec::Vec::new();
        let n = drain_into(&stream, |line| {
            lines.push(std::string::String::from_utf8(line.to_vec()).unwrap())
        });

        assert_eq!(n, 2);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("WARN router: a\n"));
        assert_eq!(lines[2], "[WARN] log: dropped 1 entries\n");
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_drain_to_writer() {
        let stream = LogStream::<4>::new();
        stream.push(5, LogLevel::Error, "tone", b"base sink is NULL");

        let mut text = std::string::String::new();
        assert_eq!(drain_to_writer(&stream, &mut text), 1);
        assert_eq!(text, "[         5] ERROR tone: base sink is NULL\n");
        assert_eq!(drain_to_writer(&stream, &mut text), 0);
    }
}
