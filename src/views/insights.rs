use std::collections::HashMap;

use crate::models::{DiaryEntry, DiaryId};

const TOP_KEYWORDS: usize = 10;

/// Aggregate mood picture across every analyzed entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentOverview {
    pub total_entries: usize,
    pub analyzed_entries: usize,
    pub complete_entries: usize,
    /// Most frequent first, ties alphabetical.
    pub emotions: Vec<(String, usize)>,
    pub top_keywords: Vec<(String, usize)>,
    pub open_questions: Vec<(DiaryId, String)>,
}

impl SentimentOverview {
    pub fn from_diaries(diaries: &[DiaryEntry]) -> Self {
        let mut emotions: HashMap<String, usize> = HashMap::new();
        let mut keywords: HashMap<String, usize> = HashMap::new();
        let mut open_questions = Vec::new();
        let mut analyzed_entries = 0;

        for diary in diaries {
            let Some(analysis) = diary.visible_analysis() else {
                continue;
            };
            analyzed_entries += 1;

            let emotion = analysis.feelings.emotion.trim().to_lowercase();
            if !emotion.is_empty() {
                *emotions.entry(emotion).or_default() += 1;
            }
            for keyword in &analysis.keywords {
                let keyword = keyword.trim().to_lowercase();
                if !keyword.is_empty() {
                    *keywords.entry(keyword).or_default() += 1;
                }
            }
            if let Some(question) = analysis.follow_up() {
                open_questions.push((diary.id, question.to_string()));
            }
        }

        let mut top_keywords = ranked(keywords);
        top_keywords.truncate(TOP_KEYWORDS);

        Self {
            total_entries: diaries.len(),
            analyzed_entries,
            complete_entries: diaries.iter().filter(|d| d.is_complete).count(),
            emotions: ranked(emotions),
            top_keywords,
            open_questions,
        }
    }

    pub fn dominant_emotion(&self) -> Option<&str> {
        self.emotions.first().map(|(e, _)| e.as_str())
    }
}

fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
