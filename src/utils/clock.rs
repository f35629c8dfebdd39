use chrono::{Local, NaiveDate};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Today's date in the user's time zone. Logged entries are dated with it.
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
