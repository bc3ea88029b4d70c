//! Event monitor
//!
//! Fixed-capacity, lock-free tap between the process callback and the
//! control loop. The callback pushes copies of incoming and outgoing events;
//! the control loop drains and logs them. Pushing never allocates or blocks:
//! when the queue is full the record is dropped and counted.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::queue::ArrayQueue;

use crate::error::SinkError;
use crate::midi::Describe;
use crate::sink::EventSink;

/// Bytes kept per record; longer messages are truncated
pub const TRACE_BYTES: usize = 8;

/// Direction of a monitored event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    fn marker(self) -> &'static str {
        match self {
            Direction::Input => "  ——›",
            Direction::Output => "‹——  ",
        }
    }
}

/// Copy of one monitored event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub direction: Direction,
    pub position: u32,
    /// Full length of the original message
    pub len: usize,
    bytes: [u8; TRACE_BYTES],
}

impl TraceRecord {
    pub fn new(direction: Direction, position: u32, data: &[u8]) -> Self {
        let mut bytes = [0u8; TRACE_BYTES];
        let kept = data.len().min(TRACE_BYTES);
        bytes[..kept].copy_from_slice(&data[..kept]);
        Self {
            direction,
            position,
            len: data.len(),
            bytes,
        }
    }

    /// Captured bytes (at most [`TRACE_BYTES`])
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len.min(TRACE_BYTES)]
    }

    pub fn is_truncated(&self) -> bool {
        self.len > TRACE_BYTES
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @{:<4} {}",
            self.direction.marker(),
            self.position,
            Describe(self.bytes())
        )?;
        if self.is_truncated() {
            write!(f, " …(+{} bytes)", self.len - TRACE_BYTES)?;
        }
        Ok(())
    }
}

/// Bounded queue of trace records
#[derive(Debug)]
pub struct EventMonitor {
    queue: ArrayQueue<TraceRecord>,
    dropped: AtomicU64,
}

impl EventMonitor {
    /// Monitor holding up to `capacity` undrained records (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn push(&self, record: TraceRecord) {
        if self.queue.push(record).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record(&self, direction: Direction, position: u32, data: &[u8]) {
        self.push(TraceRecord::new(direction, position, data));
    }

    /// Pop every queued record, oldest first
    pub fn drain(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        std::iter::from_fn(move || self.queue.pop())
    }

    /// Records dropped because the queue was full, reset on read
    pub fn take_dropped(&self) -> u64 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

/// Sink wrapper that mirrors every accepted emission into a monitor
pub struct MonitoredSink<'m, S> {
    inner: S,
    monitor: Option<&'m EventMonitor>,
}

impl<'m, S: EventSink> MonitoredSink<'m, S> {
    pub fn new(inner: S, monitor: Option<&'m EventMonitor>) -> Self {
        Self { inner, monitor }
    }
}

impl<S: EventSink> EventSink for MonitoredSink<'_, S> {
    fn emit(&mut self, position: u32, bytes: &[u8]) -> Result<(), SinkError> {
        self.inner.emit(position, bytes)?;
        if let Some(monitor) = self.monitor {
            monitor.record(Direction::Output, position, bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;

    #[test]
    fn test_drain_in_order() {
        let monitor = EventMonitor::new(4);
        monitor.record(Direction::Input, 0, &[0x98, 41, 0x7F]);
        monitor.record(Direction::Output, 0, &[0x98, 41, 0x7F]);

        let records: Vec<_> = monitor.drain().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].direction, Direction::Input);
        assert_eq!(records[1].direction, Direction::Output);
        assert_eq!(monitor.drain().count(), 0);
    }

    #[test]
    fn test_overflow_is_counted() {
        let monitor = EventMonitor::new(1);
        monitor.record(Direction::Input, 0, &[0x98, 41, 0x7F]);
        monitor.record(Direction::Input, 1, &[0x98, 42, 0x7F]);

        assert_eq!(monitor.take_dropped(), 1);
        assert_eq!(monitor.take_dropped(), 0);
        assert_eq!(monitor.drain().next().map(|r| r.position), Some(0));
    }

    #[test]
    fn test_long_messages_truncated() {
        let sysex = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x11, 0x78, 0x00, 0x00, 0xF7];
        let record = TraceRecord::new(Direction::Input, 0, &sysex);

        assert!(record.is_truncated());
        assert_eq!(record.bytes(), &sysex[..TRACE_BYTES]);
        assert!(record.to_string().ends_with("…(+2 bytes)"));
    }

    #[test]
    fn test_display_uses_describe_format() {
        let record = TraceRecord::new(Direction::Output, 12, &[0x98, 41, 0x7F]);
        assert_eq!(
            record.to_string(),
            "‹——   @12   +  {0x98} [c 9] 0x29[ 41] 0x7f[127]"
        );
    }

    #[test]
    fn test_monitored_sink_mirrors_accepted_emissions() {
        let monitor = EventMonitor::new(8);
        let mut inner = VecSink::with_capacity_limit(1);
        {
            let mut sink = MonitoredSink::new(&mut inner, Some(&monitor));
            sink.emit(3, &[0x98, 41, 0x7F]).unwrap();
            assert!(sink.emit(3, &[0x98, 45, 0x7F]).is_err());
        }

        let records: Vec<_> = monitor.drain().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, 3);
        assert_eq!(inner.events().len(), 1);
    }
}
