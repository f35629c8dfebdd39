use chrono::NaiveDate;

/// This is the standard way of writing a date into the analytics document.
pub fn date_to_entry_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::date_to_entry_date;

    #[test]
    fn test_entry_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(date_to_entry_date(date), "2025-03-05");
    }
}
