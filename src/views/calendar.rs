use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::{ClientError, ClientResult};
use crate::models::DiaryEntry;

/// One month laid out as a Sunday-first grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Blank cells before the 1st, 0 when the month starts on a Sunday.
    pub leading_blanks: u32,
    /// Entries of this month, oldest first.
    pub entries: Vec<DiaryEntry>,
    by_day: BTreeMap<u32, Vec<usize>>,
}

impl MonthView {
    pub fn build(year: i32, month: u32, diaries: &[DiaryEntry]) -> ClientResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ClientError::Validation(format!("Invalid month {}-{}", year, month)))?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| ClientError::Validation(format!("Invalid month {}-{}", year, month)))?;

        let days_in_month = (next_first - first).num_days() as u32;
        let leading_blanks = first.weekday().num_days_from_sunday();

        let mut entries: Vec<DiaryEntry> = diaries
            .iter()
            .filter(|d| d.date.year() == year && d.date.month() == month)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.0.cmp(&b.id.0)));

        let mut by_day: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_day.entry(entry.date.day()).or_default().push(idx);
        }

        Ok(Self {
            year,
            month,
            days_in_month,
            leading_blanks,
            entries,
            by_day,
        })
    }

    pub fn entries_on(&self, day: u32) -> Vec<&DiaryEntry> {
        self.by_day
            .get(&day)
            .map(|idxs| idxs.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Grid cells row by row, `None` for the leading blanks.
    pub fn cells(&self) -> Vec<Option<u32>> {
        (0..self.leading_blanks)
            .map(|_| None)
            .chain((1..=self.days_in_month).map(Some))
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = format!("{:04}-{:02}\n Su  Mo  Tu  We  Th  Fr  Sa\n", self.year, self.month);
        for (i, cell) in self.cells().iter().enumerate() {
            match cell {
                None => out.push_str("    "),
                Some(day) => {
                    let mark = if self.by_day.contains_key(day) { '*' } else { ' ' };
                    out.push_str(&format!("{:>3}{}", day, mark));
                }
            }
            if i % 7 == 6 {
                out.push('\n');
            }
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiaryId;

    fn entry(id: i64, date: &str) -> DiaryEntry {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Diary: {}", date),
            "content": "",
            "date": date,
        }))
        .unwrap()
    }

    #[test]
    fn test_february_leap_year() {
        // 2028-02-01 is a Tuesday.
        let view = MonthView::build(2028, 2, &[]).unwrap();
        assert_eq!(view.days_in_month, 29);
        assert_eq!(view.leading_blanks, 2);
        assert_eq!(view.cells().len(), 31);
    }

    #[test]
    fn test_sunday_start_has_no_blanks() {
        // 2026-03-01 is a Sunday.
        let view = MonthView::build(2026, 3, &[]).unwrap();
        assert_eq!(view.leading_blanks, 0);
        assert_eq!(view.days_in_month, 31);
    }

    #[test]
    fn test_entries_grouped_by_day() {
        let diaries = vec![
            entry(3, "2026-03-14"),
            entry(1, "2026-03-02"),
            entry(2, "2026-03-14"),
            entry(4, "2026-04-01"),
        ];
        let view = MonthView::build(2026, 3, &diaries).unwrap();
        let ids: Vec<_> = view.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![DiaryId(1), DiaryId(2), DiaryId(3)]);
        assert_eq!(view.entries_on(14).len(), 2);
        assert!(view.entries_on(1).is_empty());
        assert!(view.render().contains(" 14*"));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(MonthView::build(2026, 13, &[]).is_err());
    }
}
