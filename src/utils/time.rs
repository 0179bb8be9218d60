use std::sync::OnceLock;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// The local offset, captured once while the process is single-threaded.
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Read the local offset and remember it for the rest of the process.
///
/// `time` only reads the offset on Unix while a single thread is running, so
/// binaries call this before starting an async runtime.  Falls back to UTC
/// when the offset cannot be determined.
pub fn init_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// The offset timestamps are shown in.
///
/// This is the offset captured by [`init_local_offset`], or a fresh reading
/// (UTC when that fails) if it was never called.
pub fn local_offset() -> UtcOffset {
    match LOCAL_OFFSET.get() {
        Some(offset) => *offset,
        None => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
    }
}

/// The current time in the local offset.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

/// Format a timestamp as a wall-clock label, `HH:MM:SS`.
pub fn clock_label(timestamp: &OffsetDateTime) -> String {
    timestamp
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// Format a timestamp as a wall-clock label in `offset`.
pub fn clock_label_at(timestamp: &OffsetDateTime, offset: UtcOffset) -> String {
    clock_label(&timestamp.to_offset(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn clock_label_is_zero_padded() {
        assert_eq!(clock_label(&datetime!(2025-04-22 09:05:07 UTC)), "09:05:07");
        assert_eq!(clock_label(&datetime!(2025-04-22 23:59:59 +02:00)), "23:59:59");
    }

    #[test]
    fn clock_label_converts_to_the_offset() {
        let instant = datetime!(2025-04-22 14:05:07 UTC);
        assert_eq!(clock_label_at(&instant, offset!(-4)), "10:05:07");
        assert_eq!(clock_label_at(&instant, offset!(+5:30)), "19:35:07");
        assert_eq!(clock_label_at(&instant, UtcOffset::UTC), "14:05:07");
    }

    #[test]
    fn init_is_stable() {
        let first = init_local_offset();
        assert_eq!(init_local_offset(), first);
        assert_eq!(local_offset(), first);
        assert_eq!(now().offset(), first);
    }
}
