use anyhow::{Context, Result};
use chrono::{DateTime, Months, TimeZone, Utc};

/// The three instants every timestamp in a run is compared against.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    /// Jan 1, 00:00 UTC of the analysis year.
    pub year_start: DateTime<Utc>,
    /// First instant of the analysis month.
    pub range_start: DateTime<Utc>,
    /// One calendar month after `range_start`, exclusive.
    pub range_end: DateTime<Utc>,
}

/// Resolve a (month, year) pair into a [`DateRange`].
///
/// Two-digit years are taken to mean 20xx.
pub fn resolve(month: u32, year: i32) -> Result<DateRange> {
    let year = if year < 100 { year + 2000 } else { year };

    let year_start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("invalid year {year}"))?;

    let range_start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("invalid month {month}"))?;

    let range_end = range_start
        .checked_add_months(Months::new(1))
        .context("month arithmetic overflowed")?;

    Ok(DateRange {
        year_start,
        range_start,
        range_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn march_2020() {
        let range = resolve(3, 2020).unwrap();
        assert_eq!(range.year_start, utc(2020, 1, 1));
        assert_eq!(range.range_start, utc(2020, 3, 1));
        assert_eq!(range.range_end, utc(2020, 4, 1));
    }

    #[test]
    fn two_digit_year_means_20xx() {
        let range = resolve(3, 20).unwrap();
        assert_eq!(range.year_start, utc(2020, 1, 1));
        assert_eq!(range.range_end, utc(2020, 4, 1));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let range = resolve(12, 2021).unwrap();
        assert_eq!(range.range_start, utc(2021, 12, 1));
        assert_eq!(range.range_end, utc(2022, 1, 1));
    }

    #[test]
    fn rejects_month_thirteen() {
        assert!(resolve(13, 2020).is_err());
    }
}
