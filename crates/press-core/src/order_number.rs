//! # Order Numbers
//!
//! Human-readable, date-grouped order identifiers and the pure half of the
//! allocation protocol.
//!
//! ## Format
//! ```text
//! ORD-250114-0004        sequential: 4th order on 14 Jan 2025
//! ORD-250114-0004-317    retry candidate after a collision
//!     ──┬─── ─┬── ─┬─
//!       │     │    └── 3-digit random suffix (000-999)
//!       │     └─────── today's count + 1, zero-padded to 4 digits
//!       └───────────── YYMMDD in the shop's time zone
//! ```
//!
//! ## Allocation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  press-db                          press-core (this module)             │
//! │  ─────────                         ─────────────────────────            │
//! │  now ──────────────────────────►   ShopZone::day_window(now)            │
//! │  COUNT(orders in window) ◄──────   [start, end), YYMMDD                 │
//! │  count ────────────────────────►   AllocationPlan::new(date, count, …)  │
//! │                                    [ORD-…-0004, ORD-…-0004-317, …]      │
//! │  for candidate in plan:                                                 │
//! │    INSERT order + items (tx)                                            │
//! │    UNIQUE violation → next candidate                                    │
//! │  plan exhausted → OrderNumberAllocationFailed                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches shared state. Uniqueness is the database's UNIQUE
//! constraint; the plan only decides what to try and in what order.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Prefix on every order number.
pub const PREFIX: &str = "ORD";

/// Attempts per order creation when not configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Distinct random suffixes available per sequential number.
pub const SUFFIX_SPACE: u32 = 1000;

const DATE_FORMAT: &str = "%y%m%d";

// =============================================================================
// Order Number
// =============================================================================

/// A parsed `ORD-YYMMDD-NNNN[-RRR]` identifier.
///
/// The sequence is padded to four digits and widens past 9999 rather than
/// wrapping, so a very busy day can never produce a number that collides
/// with an earlier one of the same day by truncation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    date: NaiveDate,
    sequence: u64,
    suffix: Option<u16>,
}

impl OrderNumber {
    /// The sequential candidate for a day that already has `count_today`
    /// orders.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use press_core::order_number::OrderNumber;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
    /// assert_eq!(OrderNumber::sequential(date, 3).to_string(), "ORD-250114-0004");
    /// ```
    pub fn sequential(date: NaiveDate, count_today: u64) -> Self {
        OrderNumber {
            date,
            sequence: count_today.saturating_add(1),
            suffix: None,
        }
    }

    /// The same number with a collision suffix (taken modulo 1000).
    pub fn with_suffix(&self, suffix: u16) -> Self {
        OrderNumber {
            suffix: Some(suffix % SUFFIX_SPACE as u16),
            ..self.clone()
        }
    }

    /// Parses exactly the two documented shapes.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::order_number::OrderNumber;
    ///
    /// let n = OrderNumber::parse("ORD-250114-0004-317").unwrap();
    /// assert_eq!(n.sequence(), 4);
    /// assert_eq!(n.suffix(), Some(317));
    ///
    /// assert!(OrderNumber::parse("ORD-250114-4").is_err());
    /// assert!(OrderNumber::parse("ORD-251399-0001").is_err());
    /// ```
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidOrderNumber(s.to_string());

        let mut parts = s.split('-');
        if parts.next() != Some(PREFIX) {
            return Err(invalid());
        }

        let date_part = parts.next().ok_or_else(invalid)?;
        if date_part.len() != 6 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| invalid())?;

        let seq_part = parts.next().ok_or_else(invalid)?;
        if seq_part.len() < 4 || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let sequence: u64 = seq_part.parse().map_err(|_| invalid())?;

        let suffix = match parts.next() {
            None => None,
            Some(r) if r.len() == 3 && r.bytes().all(|b| b.is_ascii_digit()) => {
                Some(r.parse::<u16>().map_err(|_| invalid())?)
            }
            Some(_) => return Err(invalid()),
        };

        if parts.next().is_some() || sequence == 0 {
            return Err(invalid());
        }

        let parsed = OrderNumber {
            date,
            sequence,
            suffix,
        };
        // Rejects non-canonical padding such as "00004".
        if parsed.to_string() != s {
            return Err(invalid());
        }
        Ok(parsed)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `YYMMDD`.
    pub fn date_part(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn suffix(&self) -> Option<u16> {
        self.suffix
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", PREFIX, self.date_part(), self.sequence)?;
        if let Some(suffix) = self.suffix {
            write!(f, "-{:03}", suffix)?;
        }
        Ok(())
    }
}

impl FromStr for OrderNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderNumber::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderNumber::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Allocation Plan
// =============================================================================

/// The ordered candidates one order creation will try.
///
/// Planned up front so the caller can hold the RNG only for this call and
/// never across an `.await`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    candidates: Vec<OrderNumber>,
}

impl AllocationPlan {
    /// Plans `max_attempts` candidates: the sequential number first, then
    /// distinct random suffixes on it.
    ///
    /// `max_attempts` is clamped to `1..=1001` (one sequential plus every
    /// possible suffix).
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use press_core::order_number::AllocationPlan;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
    /// let plan = AllocationPlan::new(date, 3, 5, &mut rand::thread_rng());
    ///
    /// assert_eq!(plan.len(), 5);
    /// assert_eq!(plan.candidates()[0].to_string(), "ORD-250114-0004");
    /// assert!(plan.candidates()[1..].iter().all(|c| c.suffix().is_some()));
    /// ```
    pub fn new<R: Rng + ?Sized>(
        date: NaiveDate,
        count_today: u64,
        max_attempts: u32,
        rng: &mut R,
    ) -> Self {
        let attempts = max_attempts.clamp(1, SUFFIX_SPACE + 1);
        let base = OrderNumber::sequential(date, count_today);

        let retries = (attempts - 1) as usize;
        let mut candidates = Vec::with_capacity(attempts as usize);
        candidates.push(base.clone());
        candidates.extend(
            rand::seq::index::sample(rng, SUFFIX_SPACE as usize, retries)
                .into_iter()
                .map(|suffix| base.with_suffix(suffix as u16)),
        );

        AllocationPlan { candidates }
    }

    pub fn candidates(&self) -> &[OrderNumber] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl IntoIterator for AllocationPlan {
    type Item = OrderNumber;
    type IntoIter = std::vec::IntoIter<OrderNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

// =============================================================================
// Shop Zone & Day Window
// =============================================================================

/// The time zone "today" is measured in.
///
/// ## Known Limitation
/// With `Local`, a midnight that falls in a DST gap or overlap resolves to
/// the earliest valid instant. Around such a boundary two processes may
/// disagree on the day; the UNIQUE constraint and suffix retry still keep
/// numbers unique, they just may not look sequential. Pin a `Fixed` offset
/// to avoid this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopZone {
    /// The host's local time zone.
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl Default for ShopZone {
    fn default() -> Self {
        ShopZone::Local
    }
}

impl ShopZone {
    /// Parses `local`, `UTC`, `Z` or a `±HH:MM` offset.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::FixedOffset;
    /// use press_core::order_number::ShopZone;
    ///
    /// assert_eq!(
    ///     ShopZone::parse("+08:00").unwrap(),
    ///     ShopZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
    /// );
    /// assert_eq!(ShopZone::parse("local").unwrap(), ShopZone::Local);
    /// assert!(ShopZone::parse("+25:00").is_err());
    /// ```
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidConfig(format!("invalid UTC offset: {}", s));
        let s_trim = s.trim();

        if s_trim.eq_ignore_ascii_case("local") {
            return Ok(ShopZone::Local);
        }
        if s_trim.eq_ignore_ascii_case("utc") || s_trim == "Z" {
            return Ok(ShopZone::Fixed(Utc.fix()));
        }

        let (sign, rest) = match s_trim.as_bytes().first() {
            Some(b'+') => (1, &s_trim[1..]),
            Some(b'-') => (-1, &s_trim[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(ShopZone::Fixed)
            .ok_or_else(invalid)
    }

    /// The calendar day containing `now`, in this zone.
    pub fn day_window(&self, now: DateTime<Utc>) -> DayWindow {
        match self {
            ShopZone::Local => window_in(&Local, now),
            ShopZone::Fixed(offset) => window_in(offset, now),
        }
    }
}

/// One shop calendar day as UTC bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    /// Inclusive.
    pub start: DateTime<Utc>,
    /// Exclusive.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// `YYMMDD`.
    pub fn date_part(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn window_in<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> DayWindow {
    let local = now.with_timezone(tz);
    let offset = local.offset().fix();
    let date = local.date_naive();
    let next = date.succ_opt().unwrap_or(date);

    DayWindow {
        date,
        start: start_of_day(tz, date, offset),
        end: start_of_day(tz, next, offset),
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate, fallback: FixedOffset) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(instant) => instant.with_timezone(&Utc),
        // Midnight skipped by a DST jump.
        None => Utc.from_utc_datetime(
            &(midnight - Duration::seconds(i64::from(fallback.local_minus_utc()))),
        ),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn jan14() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
    }

    #[test]
    fn test_sequential_format() {
        assert_eq!(OrderNumber::sequential(jan14(), 0).to_string(), "ORD-250114-0001");
        assert_eq!(OrderNumber::sequential(jan14(), 3).to_string(), "ORD-250114-0004");
        assert_eq!(OrderNumber::sequential(jan14(), 9998).to_string(), "ORD-250114-9999");
    }

    #[test]
    fn test_sequence_widens_past_9999() {
        let n = OrderNumber::sequential(jan14(), 9999);
        assert_eq!(n.to_string(), "ORD-250114-10000");
        assert_eq!(OrderNumber::parse("ORD-250114-10000").unwrap(), n);
    }

    #[test]
    fn test_suffix_format() {
        let n = OrderNumber::sequential(jan14(), 3).with_suffix(7);
        assert_eq!(n.to_string(), "ORD-250114-0004-007");
        assert_eq!(n.date_part(), "250114");
    }

    #[test]
    fn test_parse_round_trips_both_shapes() {
        for s in ["ORD-250114-0004", "ORD-991231-0123-999", "ORD-000101-0001-000"] {
            assert_eq!(OrderNumber::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in [
            "",
            "ORD",
            "ORX-250114-0004",
            "ORD-25011-0004",
            "ORD-250230-0004",
            "ORD-250114-004",
            "ORD-250114-00004",
            "ORD-250114-0000",
            "ORD-250114-0004-31",
            "ORD-250114-0004-3170",
            "ORD-250114-0004-317-1",
            "ORD-250114-+004",
        ] {
            assert!(OrderNumber::parse(s).is_err(), "accepted {:?}", s);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let n = OrderNumber::parse("ORD-250114-0004-317").unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"ORD-250114-0004-317\"");
        assert!(serde_json::from_str::<OrderNumber>("\"nope\"").is_err());
    }

    #[test]
    fn test_plan_sequential_first_then_distinct_suffixes() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = AllocationPlan::new(jan14(), 3, 5, &mut rng);

        assert_eq!(plan.len(), 5);
        assert_eq!(plan.candidates()[0].to_string(), "ORD-250114-0004");

        let distinct: HashSet<_> = plan.candidates().iter().map(|c| c.to_string()).collect();
        assert_eq!(distinct.len(), 5);
        for retry in &plan.candidates()[1..] {
            assert_eq!(retry.sequence(), 4);
            assert!(retry.suffix().unwrap() < 1000);
        }
    }

    #[test]
    fn test_plan_attempts_are_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(AllocationPlan::new(jan14(), 0, 0, &mut rng).len(), 1);
        assert_eq!(AllocationPlan::new(jan14(), 0, 5000, &mut rng).len(), 1001);
    }

    #[test]
    fn test_shop_zone_parse() {
        assert_eq!(ShopZone::parse("UTC").unwrap(), ShopZone::Fixed(Utc.fix()));
        assert_eq!(
            ShopZone::parse("-05:30").unwrap(),
            ShopZone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap())
        );
        for bad in ["", "8", "+8:00", "+08:60", "Asia/Manila"] {
            assert!(ShopZone::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_day_window_in_fixed_offset() {
        let manila = ShopZone::parse("+08:00").unwrap();
        // 2025-01-13 17:30 UTC is 2025-01-14 01:30 in +08:00
        let now = Utc.with_ymd_and_hms(2025, 1, 13, 17, 30, 0).unwrap();
        let window = manila.day_window(now);

        assert_eq!(window.date, jan14());
        assert_eq!(window.date_part(), "250114");
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 1, 13, 16, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 14, 16, 0, 0).unwrap());
        assert!(window.contains(now));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_day_window_local_contains_now() {
        let now = Utc::now();
        let window = ShopZone::Local.day_window(now);
        assert!(window.contains(now));
        assert!(window.start < window.end);
    }
}
