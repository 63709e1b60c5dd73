// src/common/timing.rs

use core::time::Duration;

// === Wake Timing ===

/// Inactivity after which the instrument may have gone to sleep. A command sent after a longer
/// pause is preceded by a wake byte.
pub const WAKE_IDLE_THRESHOLD_MS: u64 = 8_000;

/// Byte sent to rouse a sleeping instrument.
pub const WAKE_BYTE: u8 = b'\r';

/// Settling time after the wake byte before the command itself is written.
pub const WAKE_SETTLE_DELAY: Duration = Duration::from_millis(50);

// === Callback Timeouts ===

/// Default timeout handed to the read/write callbacks for a new connection.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1_000);

// === Sampling Limits ===

/// Longest sampling period accepted by any instrument (24 hours).
pub const MAX_SAMPLING_PERIOD_MS: u32 = 86_400_000;

/// Sampling periods at or above this are set freely; shorter ones must be advertised by the
/// instrument as available fast periods.
pub const FAST_PERIOD_LIMIT_MS: u32 = 1_000;

/// 3 Hz sampling period.
pub const PERIOD_3HZ_MS: u32 = 333;

/// 5 Hz sampling period.
pub const PERIOD_5HZ_MS: u32 = 200;
