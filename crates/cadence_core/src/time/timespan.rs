//! # TimeSpan
//!
//! Unit-tagged signed time value. All mixed-unit arithmetic and comparison
//! normalizes to nanoseconds; same-unit operations keep their unit so a
//! seconds-denominated config value stays readable in a debugger.
//!
//! Construction never loses precision. Only the explicit integer accessors
//! truncate.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// The unit a [`TimeSpan`] value is denominated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    /// Whole seconds.
    Seconds,
    /// Milliseconds (1e-3 s).
    Milliseconds,
    /// Microseconds (1e-6 s).
    Microseconds,
    /// Nanoseconds (1e-9 s).
    Nanoseconds,
}

/// A signed 64-bit time magnitude plus its unit.
///
/// Immutable value type; copy it freely. The clock hands these out in
/// nanoseconds, config files usually speak milliseconds, and the two mix
/// without explicit conversion at every call site.
#[derive(Clone, Copy, Debug)]
pub struct TimeSpan {
    value: i64,
    unit: TimeUnit,
}

impl TimeSpan {
    /// Creates a span of `value` in `unit`.
    #[inline]
    #[must_use]
    pub const fn new(value: i64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// The zero span (nanosecond-denominated).
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, TimeUnit::Nanoseconds)
    }

    /// A span of whole seconds.
    #[inline]
    #[must_use]
    pub const fn secs(value: i64) -> Self {
        Self::new(value, TimeUnit::Seconds)
    }

    /// A span of milliseconds.
    #[inline]
    #[must_use]
    pub const fn millis(value: i64) -> Self {
        Self::new(value, TimeUnit::Milliseconds)
    }

    /// A span of microseconds.
    #[inline]
    #[must_use]
    pub const fn micros(value: i64) -> Self {
        Self::new(value, TimeUnit::Microseconds)
    }

    /// A span of nanoseconds.
    #[inline]
    #[must_use]
    pub const fn nanos(value: i64) -> Self {
        Self::new(value, TimeUnit::Nanoseconds)
    }

    /// The raw magnitude, in whatever unit this span carries.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.value
    }

    /// The unit the magnitude is denominated in.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> TimeUnit {
        self.unit
    }

    // --------------------
    // Integer conversions (truncate)
    // --------------------

    /// Whole nanoseconds. Saturates on extreme magnitudes instead of wrapping.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        to_nanos(self.value, self.unit)
    }

    /// Whole microseconds (truncates toward zero).
    #[inline]
    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.as_nanos() / 1_000
    }

    /// Whole milliseconds (truncates toward zero).
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.as_nanos() / 1_000_000
    }

    /// Whole seconds (truncates toward zero).
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.as_nanos() / 1_000_000_000
    }

    // --------------------
    // Floating-point conversions (no truncation)
    // --------------------

    /// Seconds as `f64`.
    ///
    /// Scales directly from the source unit rather than through integer
    /// nanoseconds, so magnitudes that would overflow an `i64` of
    /// nanoseconds still convert.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let v = self.value as f64;
        match self.unit {
            TimeUnit::Seconds => v,
            TimeUnit::Milliseconds => v * 1e-3,
            TimeUnit::Microseconds => v * 1e-6,
            TimeUnit::Nanoseconds => v * 1e-9,
        }
    }

    /// Milliseconds as `f64`.
    #[inline]
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.as_secs_f64() * 1e3
    }

    /// Microseconds as `f64`.
    #[inline]
    #[must_use]
    pub fn as_micros_f64(self) -> f64 {
        self.as_secs_f64() * 1e6
    }

    /// Nanoseconds as `f64`.
    #[inline]
    #[must_use]
    pub fn as_nanos_f64(self) -> f64 {
        self.as_secs_f64() * 1e9
    }

    /// True when the span is zero, regardless of unit.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }
}

/// Normalizes `value` in `unit` to nanoseconds, saturating on overflow.
#[inline]
const fn to_nanos(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Seconds => value.saturating_mul(1_000_000_000),
        TimeUnit::Milliseconds => value.saturating_mul(1_000_000),
        TimeUnit::Microseconds => value.saturating_mul(1_000),
        TimeUnit::Nanoseconds => value,
    }
}

impl Default for TimeSpan {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for TimeSpan {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.unit == other.unit {
            return self.value == other.value;
        }
        self.as_nanos() == other.as_nanos()
    }
}

impl PartialOrd for TimeSpan {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.unit == other.unit {
            return self.value.partial_cmp(&other.value);
        }
        self.as_nanos().partial_cmp(&other.as_nanos())
    }
}

impl Add for TimeSpan {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        if self.unit == rhs.unit {
            return Self::new(self.value.saturating_add(rhs.value), self.unit);
        }
        Self::nanos(self.as_nanos().saturating_add(rhs.as_nanos()))
    }
}

impl Sub for TimeSpan {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.unit == rhs.unit {
            return Self::new(self.value.saturating_sub(rhs.value), self.unit);
        }
        Self::nanos(self.as_nanos().saturating_sub(rhs.as_nanos()))
    }
}

impl Mul<i64> for TimeSpan {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self {
        Self::new(self.value.saturating_mul(rhs), self.unit)
    }
}

impl Div<i64> for TimeSpan {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i64) -> Self {
        Self::new(self.value / rhs, self.unit)
    }
}

impl Neg for TimeSpan {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.value, self.unit)
    }
}

impl AddAssign for TimeSpan {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for TimeSpan {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
            TimeUnit::Nanoseconds => "ns",
        };
        write!(f, "{}{suffix}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trip_is_lossless() {
        assert_eq!(TimeSpan::secs(3).as_nanos(), 3_000_000_000);
        assert_eq!(TimeSpan::nanos(3_000_000_000).as_secs(), 3);
        assert_eq!(TimeSpan::millis(250).as_nanos(), 250_000_000);
        assert_eq!(TimeSpan::nanos(250_000_000).as_millis(), 250);
        assert_eq!(TimeSpan::micros(16_666).as_nanos(), 16_666_000);
        assert_eq!(TimeSpan::nanos(16_666_000).as_micros(), 16_666);
    }

    #[test]
    fn test_integer_accessors_truncate() {
        let span = TimeSpan::nanos(1_999_999_999);
        assert_eq!(span.as_secs(), 1);
        assert_eq!(span.as_millis(), 1_999);
        assert_eq!(span.as_micros(), 1_999_999);
    }

    #[test]
    fn test_float_accessors_do_not_truncate() {
        let span = TimeSpan::millis(1_500);
        assert!((span.as_secs_f64() - 1.5).abs() < 1e-12);
        assert!((span.as_micros_f64() - 1_500_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_sub_inverse_across_units() {
        let pairs = [
            (TimeSpan::secs(2), TimeSpan::millis(16)),
            (TimeSpan::millis(7), TimeSpan::micros(333)),
            (TimeSpan::nanos(-500), TimeSpan::secs(1)),
            (TimeSpan::micros(0), TimeSpan::nanos(42)),
        ];
        for (a, b) in pairs {
            assert_eq!((a + b) - b, a, "(a + b) - b must equal a for {a} {b}");
        }
    }

    #[test]
    fn test_same_unit_arithmetic_keeps_unit() {
        let sum = TimeSpan::millis(10) + TimeSpan::millis(6);
        assert_eq!(sum.unit(), TimeUnit::Milliseconds);
        assert_eq!(sum.value(), 16);
    }

    #[test]
    fn test_mixed_unit_comparison() {
        assert!(TimeSpan::millis(1) > TimeSpan::micros(999));
        assert!(TimeSpan::secs(1) == TimeSpan::millis(1_000));
        assert!(TimeSpan::nanos(-1) < TimeSpan::zero());
        assert!(TimeSpan::micros(200) >= TimeSpan::nanos(200_000));
    }

    #[test]
    fn test_scalar_ops() {
        let frame = TimeSpan::micros(16_666);
        assert_eq!(frame * 2, TimeSpan::micros(33_332));
        assert_eq!(frame / 2, TimeSpan::micros(8_333));
        assert_eq!(-frame, TimeSpan::micros(-16_666));
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeSpan::millis(16).to_string(), "16ms");
        assert_eq!(TimeSpan::nanos(-3).to_string(), "-3ns");
    }
}
