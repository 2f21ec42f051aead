use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Returns the current calendar day.
    ///
    /// The system clock reports the process-local day; a fixed clock reports
    /// the UTC day of its instant so tests do not depend on the host timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Default => Local::now().date_naive(),
            Clock::Fixed(t) => t.date_naive(),
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

/// Returns a `Clock` fixed at noon UTC on the given calendar day.
///
/// # Panics
///
/// Panics if the date string is not `YYYY-MM-DD`.
#[must_use]
pub fn clock_on(date: &str) -> Clock {
    let day: NaiveDate = date.parse().expect("date should be YYYY-MM-DD");
    let noon = day
        .and_hms_opt(12, 0, 0)
        .expect("noon should be valid")
        .and_utc();
    Clock::fixed(noon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_utc_day() {
        let clock = fixed_clock();
        assert_eq!(clock.today().to_string(), "2023-11-14");
    }

    #[test]
    fn advancing_a_fixed_clock_moves_the_day() {
        let mut clock = clock_on("2024-01-01");
        clock.advance(Duration::days(1));
        assert_eq!(clock.today().to_string(), "2024-01-02");
    }

    #[test]
    fn advance_is_a_no_op_on_the_system_clock() {
        let mut clock = Clock::default_clock();
        clock.advance(Duration::days(3));
        assert!(matches!(clock, Clock::Default));
    }
}
