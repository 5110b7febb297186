use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Reference instant and the zone whose calendar days the dashboard counts in.
///
/// Views never read the wall clock themselves; callers build one of these per
/// query so "today" is explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    now: DateTime<Utc>,
    tz: Tz,
}

impl Clock {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    pub fn system(tz: Tz) -> Self {
        Self::new(Utc::now(), tz)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn today(&self) -> NaiveDate {
        self.local_day(self.now)
    }

    /// Calendar day of `ts` in the clock's zone.
    pub fn local_day(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    /// Whether `ts` falls on a local day in `(today + after, today + through]`.
    /// `after = None` makes the window start at today inclusive. Offsets past
    /// the last representable date leave that end of the window open.
    pub fn within_days(&self, ts: DateTime<Utc>, after: Option<u32>, through: u32) -> bool {
        let today = self.today();
        let day = self.local_day(ts);
        let lower_ok = match after {
            Some(after) => today
                .checked_add_days(Days::new(u64::from(after)))
                .is_some_and(|start| day > start),
            None => day >= today,
        };
        let upper_ok = today
            .checked_add_days(Days::new(u64::from(through)))
            .map_or(true, |end| day <= end);
        lower_ok && upper_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> Clock {
        Clock::new(
            Utc.with_ymd_and_hms(2025, 1, 23, 3, 0, 0).unwrap(),
            chrono_tz::UTC,
        )
    }

    #[test]
    fn huge_offsets_leave_the_window_open() {
        let far = Utc.with_ymd_and_hms(9000, 1, 1, 0, 0, 0).unwrap();
        assert!(clock().within_days(far, None, u32::MAX));
        assert!(!clock().within_days(far, Some(u32::MAX), u32::MAX));
        assert!(!clock().within_days(clock().now() - chrono::Duration::days(1), None, u32::MAX));
    }
}
