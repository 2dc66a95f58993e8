use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

use crate::api::DiaryService;
use crate::cli::PeriodArgs;
use crate::dto::{CreateDiaryRequest, UpdateDiaryRequest};
use crate::error::ClientResult;
use crate::models::{DiaryEntry, DiaryId, Period, SentimentAnalysis, StructuredContent};

pub async fn list<S: DiaryService + ?Sized>(service: &S) -> ClientResult<String> {
    let diaries = service.list_diaries().await?;
    if diaries.is_empty() {
        return Ok("No diary entries yet".to_string());
    }
    Ok(render_list(diaries))
}

/// Entries under month headings, newest month and newest entry first.
fn render_list(mut diaries: Vec<DiaryEntry>) -> String {
    diaries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut out = String::new();
    let mut month = None;
    for diary in &diaries {
        let this_month = (diary.date.year(), diary.date.month());
        if month != Some(this_month) {
            if month.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", diary.date.format("%B %Y"));
            month = Some(this_month);
        }
        let _ = writeln!(
            out,
            "  #{:<5} {}  {}{}",
            diary.id,
            diary.date,
            diary.title,
            flags(diary)
        );
    }
    out
}

pub async fn show<S: DiaryService + ?Sized>(service: &S, id: DiaryId) -> ClientResult<String> {
    let diary = service.get_diary(id).await?;
    Ok(render_entry(&diary))
}

pub async fn create<S: DiaryService + ?Sized>(
    service: &S,
    title: String,
    content: String,
    date: NaiveDate,
    periods: PeriodArgs,
) -> ClientResult<String> {
    let req = CreateDiaryRequest::new(title, content, date)
        .with_structured_content(structured(periods));
    let diary = service.create_diary(&req).await?;
    tracing::info!(diary_id = %diary.id, "Diary created");
    Ok(format!("Created #{} {}", diary.id, diary.title))
}

pub async fn edit<S: DiaryService + ?Sized>(
    service: &S,
    id: DiaryId,
    title: Option<String>,
    content: Option<String>,
    date: Option<NaiveDate>,
    periods: PeriodArgs,
) -> ClientResult<String> {
    let sections = structured(periods);
    let req = UpdateDiaryRequest {
        title,
        content,
        date,
        structured_content: (!sections.is_empty()).then_some(sections),
    };
    let diary = service.update_diary(id, &req).await?;
    Ok(format!("Updated #{} {}", diary.id, diary.title))
}

pub async fn delete<S: DiaryService + ?Sized>(service: &S, id: DiaryId) -> ClientResult<String> {
    service.delete_diary(id).await?;
    tracing::info!(diary_id = %id, "Diary deleted");
    Ok(format!("Deleted #{}", id))
}

pub async fn analyze<S: DiaryService + ?Sized>(service: &S, id: DiaryId) -> ClientResult<String> {
    let analysis = service.request_analysis(id).await?;
    Ok(render_analysis(&analysis))
}

fn structured(periods: PeriodArgs) -> StructuredContent {
    StructuredContent {
        morning: periods.morning,
        afternoon: periods.afternoon,
        evening: periods.evening,
    }
}

fn flags(diary: &DiaryEntry) -> String {
    let mut flags = Vec::new();
    if diary.is_complete {
        flags.push("complete");
    }
    if diary.is_analyzed {
        flags.push("analyzed");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", flags.join(", "))
    }
}

pub fn render_entry(diary: &DiaryEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}{}", diary.id, diary.title, flags(diary));
    let _ = writeln!(out, "{}", diary.date.format("%A, %B %-d, %Y"));
    out.push('\n');

    let has_sections = Period::ALL
        .iter()
        .any(|p| diary.period_text(*p).is_some());
    if has_sections {
        for period in Period::ALL {
            if let Some(text) = diary.period_text(period) {
                let _ = writeln!(out, "[{}]\n{}\n", period, text);
            }
        }
    } else if !diary.content.trim().is_empty() {
        let _ = writeln!(out, "{}\n", diary.content.trim());
    }

    if let Some(answer) = diary.meaningful_answer.as_deref().filter(|a| !a.trim().is_empty()) {
        if let Some(question) = &diary.meaningful_question {
            let _ = writeln!(out, "Q: {}", question);
        }
        let _ = writeln!(out, "A: {}\n", answer);
    }

    match diary.visible_analysis() {
        Some(analysis) => out.push_str(&render_analysis(analysis)),
        None => out.push_str("Not analyzed yet. Run `record diary analyze` to request one.\n"),
    }
    out
}

fn render_analysis(analysis: &SentimentAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mood: {}", analysis.feelings.emotion);
    if !analysis.feelings.reason.is_empty() {
        let _ = writeln!(out, "Why: {}", analysis.feelings.reason);
    }
    if !analysis.keywords.is_empty() {
        let _ = writeln!(out, "Keywords: {}", analysis.keywords.join(", "));
    }
    for period in Period::ALL {
        let summary = analysis.summary.get(period);
        if !summary.is_empty() {
            let _ = writeln!(out, "{}: {}", period, summary);
        }
    }
    if let Some(question) = analysis.follow_up() {
        let _ = writeln!(out, "Something to think about: {}", question);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_entry_prefers_sections() {
        let diary: DiaryEntry = serde_json::from_value(json!({
            "id": 8,
            "title": "Diary: 2026-03-02",
            "content": "flat text",
            "date": "2026-03-02",
            "structuredContent": { "morning": "Gym", "evening": "Read a book" },
            "isAnalyzed": true,
            "analysis": {
                "feelings": { "emotion": "content", "reason": "Productive day" },
                "keywords": ["gym", "book"],
                "summary": { "morning": "Exercise", "afternoon": "", "evening": "Reading" }
            }
        }))
        .unwrap();

        let text = render_entry(&diary);
        assert!(text.starts_with("#8 Diary: 2026-03-02  [analyzed]"));
        assert!(text.contains("Monday, March 2, 2026"));
        assert!(text.contains("[morning]\nGym"));
        assert!(!text.contains("flat text"));
        assert!(text.contains("Mood: content"));
        assert!(text.contains("Keywords: gym, book"));
        assert!(!text.contains("afternoon:"));
    }

    #[test]
    fn test_list_grouped_by_month() {
        let diaries: Vec<DiaryEntry> = serde_json::from_value(json!([
            { "id": 1, "title": "New year", "content": "", "date": "2026-01-01" },
            { "id": 2, "title": "Spring", "content": "", "date": "2026-03-20", "isComplete": true },
            { "id": 3, "title": "Winter", "content": "", "date": "2025-12-24" },
            { "id": 4, "title": "Early spring", "content": "", "date": "2026-03-02" }
        ]))
        .unwrap();

        let text = render_list(diaries);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "March 2026",
                "  #2     2026-03-20  Spring  [complete]",
                "  #4     2026-03-02  Early spring",
                "",
                "January 2026",
                "  #1     2026-01-01  New year",
                "",
                "December 2025",
                "  #3     2025-12-24  Winter",
            ]
        );
    }

    #[test]
    fn test_unanalyzed_entry_hides_analysis() {
        let diary: DiaryEntry = serde_json::from_value(json!({
            "id": 2,
            "title": "t",
            "content": "plain",
            "date": "2026-03-03",
            "isAnalyzed": false,
            "analysis": { "feelings": { "emotion": "sad" } }
        }))
        .unwrap();
        let text = render_entry(&diary);
        assert!(text.contains("plain"));
        assert!(!text.contains("Mood"));
    }
}
