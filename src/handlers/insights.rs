use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use crate::api::DiaryService;
use crate::error::ClientResult;
use crate::views::{MonthView, SentimentOverview};

pub async fn calendar<S: DiaryService + ?Sized>(
    service: &S,
    year: i32,
    month: u32,
) -> ClientResult<String> {
    let diaries = service.list_diaries().await?;
    let view = MonthView::build(year, month, &diaries)?;

    let mut out = view.render();
    if view.entries.is_empty() {
        out.push_str("\nNo entries this month\n");
        return Ok(out);
    }
    out.push('\n');
    for day in 1..=view.days_in_month {
        for entry in view.entries_on(day) {
            let _ = writeln!(out, "{:>2}  #{} {}", day, entry.id, entry.title);
        }
    }
    Ok(out)
}

/// Year and month shown when none are given.
pub fn current_month(today: NaiveDate) -> (i32, u32) {
    (today.year(), today.month())
}

pub async fn insights<S: DiaryService + ?Sized>(service: &S) -> ClientResult<String> {
    let diaries = service.list_diaries().await?;
    Ok(render_overview(&SentimentOverview::from_diaries(&diaries)))
}

fn render_overview(overview: &SentimentOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} entries, {} analyzed, {} complete",
        overview.total_entries, overview.analyzed_entries, overview.complete_entries
    );
    if overview.analyzed_entries == 0 {
        out.push_str("No analyzed entries yet\n");
        return out;
    }

    if let Some(emotion) = overview.dominant_emotion() {
        let _ = writeln!(out, "Most common mood: {}", emotion);
    }
    out.push_str("\nMoods\n");
    for (emotion, count) in &overview.emotions {
        let _ = writeln!(out, "  {:<12} {}", emotion, count);
    }
    if !overview.top_keywords.is_empty() {
        let words: Vec<String> = overview
            .top_keywords
            .iter()
            .map(|(k, n)| format!("{} ({})", k, n))
            .collect();
        let _ = writeln!(out, "\nKeywords: {}", words.join(", "));
    }
    if !overview.open_questions.is_empty() {
        out.push_str("\nQuestions to reflect on\n");
        for (id, question) in &overview.open_questions {
            let _ = writeln!(out, "  #{} {}", id, question);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overview() {
        let text = render_overview(&SentimentOverview::default());
        assert!(text.starts_with("0 entries, 0 analyzed, 0 complete"));
        assert!(text.contains("No analyzed entries yet"));
    }

    #[test]
    fn test_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(current_month(today), (2026, 10));
    }
}
