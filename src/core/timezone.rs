use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Server-side business timezone.
///
/// Timestamps are stored as UTC. Calendar-day logic (order-number sequences,
/// due dates, reminder windows) is evaluated in this fixed offset so a run at
/// 02:00 local time sees the same "today" regardless of the host clock's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock in the host's local offset as observed right now
    pub fn host_local() -> Self {
        Self::new(Local::now().offset().fix())
    }

    /// Clock from a UTC offset in minutes (east positive)
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's calendar date in the business timezone
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Calendar date a UTC instant falls on in the business timezone
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// `[startOfDay, endOfDay)` of `date` in the business timezone, as UTC instants
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of_day(date);
        let next = date
            .checked_add_days(Days::new(1))
            .map(|d| self.start_of_day(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start, next)
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        // A fixed offset has no gaps, so local midnight always resolves.
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        match self.offset.from_local_datetime(&midnight).single() {
            Some(local) => local.with_timezone(&Utc),
            None => DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc),
        }
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::host_local()
    }
}
