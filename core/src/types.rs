//! Shared primitive types used across the entire core.

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// A span of wall-clock milliseconds.
pub type DurationMs = u64;
