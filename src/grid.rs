use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Monday-first column headings for the month grid.
pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One position in the rendered month: leading padding or a concrete day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blank,
    Day(NaiveDate),
}

impl Cell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Blank => None,
            Cell::Day(date) => Some(*date),
        }
    }

    pub fn key(&self) -> Option<String> {
        self.date().map(date_key)
    }
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("invalid month (use YYYY-MM): {0}")]
    InvalidMonth(String),
}

/// Canonical zero-padded date key, e.g. "2024-03-05".
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn first_of_month(anchor: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1).unwrap_or(anchor)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or(first);
    next.pred_opt().map(|d| d.day()).unwrap_or(28)
}

/// Cells for the month containing `anchor`, grouped into rows of seven.
///
/// The first row starts with one blank per weekday preceding day 1
/// (Monday-first), and the final row is left short rather than padded
/// with trailing blanks.
pub fn month_cells(anchor: NaiveDate) -> Vec<Vec<Cell>> {
    let first = first_of_month(anchor);
    let days = days_in_month(first.year(), first.month());
    let start_offset = first.weekday().num_days_from_monday() as usize;

    let mut rows = Vec::new();
    let mut row: Vec<Cell> = Vec::with_capacity(7);
    for _ in 0..start_offset {
        row.push(Cell::Blank);
    }
    for day in 1..=days {
        if let Some(date) = NaiveDate::from_ymd_opt(first.year(), first.month(), day) {
            row.push(Cell::Day(date));
        }
        if row.len() == 7 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

pub fn month_label(anchor: NaiveDate) -> String {
    anchor.format("%B %Y").to_string()
}

/// Shifts `anchor` by `delta` months (negative = backward), normalizing
/// year rollover and clamping the day to the target month's length.
pub fn advance_month(anchor: NaiveDate, delta: i32) -> NaiveDate {
    let total = anchor.year() * 12 + anchor.month0() as i32 + delta;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = anchor.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(anchor)
}

/// Parses "YYYY-MM" into the first day of that month.
pub fn parse_month(text: &str) -> Result<NaiveDate, GridError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
        .map_err(|_| GridError::InvalidMonth(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat(rows: &[Vec<Cell>]) -> Vec<Cell> {
        rows.iter().flatten().copied().collect()
    }

    #[test]
    fn day_counts() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn grid_has_one_cell_per_day() {
        for month in 1..=12 {
            let rows = month_cells(date(2024, month, 15));
            let days: Vec<_> = flat(&rows)
                .into_iter()
                .filter_map(|c| c.date())
                .collect();
            assert_eq!(days.len() as u32, days_in_month(2024, month));
            assert_eq!(days[0].day(), 1);
            assert_eq!(days.last().unwrap().day(), days_in_month(2024, month));
        }
    }

    #[test]
    fn leading_blanks_match_weekday_of_first() {
        // May 2024 starts on a Wednesday.
        let rows = month_cells(date(2024, 5, 20));
        let blanks = flat(&rows)
            .iter()
            .take_while(|c| **c == Cell::Blank)
            .count();
        assert_eq!(blanks, 2);
        assert_eq!(rows[0].len(), 7);

        // September 2025 starts on a Monday: no padding at all.
        let rows = month_cells(date(2025, 9, 1));
        assert_eq!(rows[0][0], Cell::Day(date(2025, 9, 1)));
    }

    #[test]
    fn rows_are_weeks_and_last_may_be_short() {
        let rows = month_cells(date(2024, 5, 1));
        // 2 blanks + 31 days = 33 cells over 5 rows, last row holds 5.
        assert_eq!(rows.len(), 5);
        for row in &rows[..rows.len() - 1] {
            assert_eq!(row.len(), 7);
        }
        assert_eq!(rows.last().unwrap().len(), 5);
    }

    #[test]
    fn advance_month_round_trips() {
        let anchor = date(2024, 3, 15);
        let there = advance_month(anchor, 1);
        let back = advance_month(there, -1);
        assert_eq!((back.year(), back.month()), (2024, 3));
    }

    #[test]
    fn advance_month_rolls_over_years() {
        let next = advance_month(date(2024, 12, 5), 1);
        assert_eq!((next.year(), next.month()), (2025, 1));
        let prev = advance_month(date(2024, 1, 5), -1);
        assert_eq!((prev.year(), prev.month()), (2023, 12));
        let far = advance_month(date(2024, 6, 5), -18);
        assert_eq!((far.year(), far.month()), (2022, 12));
    }

    #[test]
    fn advance_month_clamps_day() {
        let feb = advance_month(date(2024, 1, 31), 1);
        assert_eq!(feb, date(2024, 2, 29));
        let feb = advance_month(date(2023, 1, 31), 1);
        assert_eq!(feb, date(2023, 2, 28));
    }

    #[test]
    fn date_keys_are_zero_padded() {
        assert_eq!(date_key(date(2024, 3, 5)), "2024-03-05");
        assert_eq!(date_key(date(999, 12, 31)), "0999-12-31");
    }

    #[test]
    fn parse_month_accepts_year_dash_month() {
        let anchor = parse_month("2024-03").unwrap();
        assert_eq!(anchor, date(2024, 3, 1));
        assert!(parse_month("march").is_err());
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn month_label_names_the_month() {
        assert_eq!(month_label(date(2024, 3, 15)), "March 2024");
    }
}
