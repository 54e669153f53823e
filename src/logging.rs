//! RT-safe logging for the tone engine.
//!
//! ```text
//! Audio loop             LogStream            Drain (same loop, later)
//! ──────────             ─────────            ────────────────────────
//!
//! rt_warn!() ─────────▶ [L0][L1][L2] ──────▶ UART TX / fmt::Write
//! fixed stack buffer      lock-free           may block
//! never blocks            ring buffer
//! ```
//!
//! The audio path formats into a stack buffer and pushes a fixed-size entry.
//! When the ring is full the entry is dropped and counted, the caller never
//! waits. Each entry carries the component tag of its producer.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 128;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Wall clock of the producer in microseconds.
    pub timestamp_us: u64,
    pub level: LogLevel,
    /// Component that produced the entry ("tone", "router", ...).
    pub tag: &'static str,
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        tag: "",
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Bytes after the first invalid UTF-8 sequence are dropped.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log ring (multiple producers, single drain).
///
/// Producers reserve a slot with a CAS on the write index, so pushes
/// from an interrupt-driven switch handler and from the audio loop never
/// alias. A push that finds the ring full is counted in `dropped()`.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    max_level: AtomicU32,
}

// SAFETY: producers get unique slots from the CAS, the single drainer
// only reads slots behind the write index.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create an empty stream that keeps everything up to `Debug`.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_level: AtomicU32::new(LogLevel::Debug as u32),
        }
    }

    /// Most verbose level that is still queued.
    #[inline]
    pub fn set_max_level(&self, level: LogLevel) {
        self.max_level.store(level as u32, Ordering::Relaxed);
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        (level as u32) <= self.max_level.load(Ordering::Relaxed)
    }

    /// Push a log entry. Never blocks.
    ///
    /// Returns `false` if the level is filtered out or the ring is full.
    #[inline]
    pub fn push(&self, timestamp_us: u64, level: LogLevel, tag: &'static str, msg: &[u8]) -> bool {
        if !self.enabled(level) {
            return false;
        }

        let mut slot = self.write_idx.load(Ordering::Acquire);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if slot.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                slot,
                slot.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => slot = current,
            }
        }

        let idx = (slot as usize) & Self::MASK;

        // SAFETY: `slot` is unique to this producer.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            let len = msg.len().min(MAX_MSG_LEN);
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.tag = tag;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        true
    }

    /// Take the oldest entry, if any.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: single drainer, slot is behind the write index.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a fixed buffer, truncating silently.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `fmt::Write` over a byte slice; excess output is discarded.
///
/// Output is cut on a character boundary and nothing is written after the
/// first cut.
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let mut to_write = bytes.len().min(self.buf.len() - self.pos);
        while !s.is_char_boundary(to_write) {
            to_write -= 1;
        }
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        if to_write < bytes.len() {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

/// RT-safe log macro.
///
/// ```ignore
/// rt_log!(LogLevel::Warn, self.log, now_us, "router", "short write {}/{}", n, len);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {{
        let level = $level;
        if $stream.enabled(level) {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $stream.push($timestamp, level, $tag, &buf[..len]);
        }
    }};
}

#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $tag, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $tag, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $tag, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $tag, $($arg)*)
    };
}

#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $tag:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $tag, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain_keeps_tag() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, "tone", b"started 425Hz"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.tag, "tone");
        assert_eq!(entry.message(), "started 425Hz");
        assert!(!stream.has_entries());
    }

    #[test]
    fn test_full_ring_drops_and_counts() {
        let stream = LogStream::<4>::new();

        for i in 0..4 {
            assert!(stream.push(i, LogLevel::Warn, "router", b"x"));
        }
        assert!(!stream.push(5, LogLevel::Warn, "router", b"y"));
        assert_eq!(stream.dropped(), 1);

        stream.drain();
        assert!(stream.push(6, LogLevel::Warn, "router", b"z"));
        assert_eq!(stream.take_dropped(), 1);
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_level_filter() {
        let stream = LogStream::<8>::new();
        assert!(!stream.push(0, LogLevel::Trace, "tone", b"hidden"));

        stream.set_max_level(LogLevel::Warn);
        assert!(!stream.push(0, LogLevel::Info, "tone", b"hidden"));
        assert!(stream.push(0, LogLevel::Error, "tone", b"shown"));
        assert_eq!(stream.pending(), 1);
    }

    #[test]
    fn test_macro_formats_into_entry() {
        let stream = LogStream::<8>::new();
        crate::rt_warn!(stream, 42, "router", "short write {}/{}", 160, 320);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), "short write 160/320");
    }

    #[test]
    fn test_long_message_truncated() {
        let mut buf = [0u8; 8];
        let len = format_to_buffer(&mut buf, format_args!("frame {} dropped", 123456));
        assert_eq!(&buf[..len], b"frame 12");
    }

    #[test]
    fn test_truncation_keeps_whole_characters() {
        // 'µ' takes 2 bytes, only 1 is left at offset 7
        let mut buf = [0u8; 8];
        let len = format_to_buffer(&mut buf, format_args!("late {}{}", 12, "µs ok"));
        assert_eq!(&buf[..len], b"late 12");
        assert!(core::str::from_utf8(&buf[..len]).is_ok());
    }

    #[test]
    fn test_message_cut_mid_character_keeps_prefix() {
        let stream = LogStream::<8>::new();
        let text = "gain 0.5µ".as_bytes();
        stream.push(0, LogLevel::Info, "gain", &text[..text.len() - 1]);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.message(), "gain 0.5");
    }

    #[test]
    fn test_concurrent_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for j in 0..10 {
                        let msg = format!("t{} m{}", t, j);
                        stream.push(j, LogLevel::Info, "test", msg.as_bytes());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40);
    }
}
