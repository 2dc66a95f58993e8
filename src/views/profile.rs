use crate::models::{DiaryEntry, User};

const RECENT_ENTRIES: usize = 3;

/// Account summary: who is signed in and how much they have written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStats {
    pub user: User,
    pub total_entries: usize,
    pub total_words: usize,
    /// Newest first.
    pub recent: Vec<DiaryEntry>,
}

impl ProfileStats {
    pub fn from_diaries(user: User, diaries: &[DiaryEntry]) -> Self {
        let total_words = diaries
            .iter()
            .map(|d| d.content.split_whitespace().count())
            .sum();

        let mut recent: Vec<&DiaryEntry> = diaries.iter().collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        Self {
            user,
            total_entries: diaries.len(),
            total_words,
            recent: recent
                .into_iter()
                .take(RECENT_ENTRIES)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiaryId;
    use serde_json::json;

    fn entry(id: i64, date: &str, content: &str) -> DiaryEntry {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Diary: {}", date),
            "content": content,
            "date": date,
        }))
        .unwrap()
    }

    fn mina() -> User {
        User {
            id: 3,
            username: "mina".into(),
            email: "m@example.com".into(),
        }
    }

    #[test]
    fn test_counts_words_and_keeps_three_newest() {
        let diaries = vec![
            entry(1, "2026-01-04", "Slept in"),
            entry(2, "2026-03-10", "  Long walk\n by the river "),
            entry(3, "2026-02-01", ""),
            entry(4, "2026-03-10", "Read"),
            entry(5, "2025-12-31", "New year's eve party"),
        ];

        let stats = ProfileStats::from_diaries(mina(), &diaries);
        assert_eq!(stats.user.username, "mina");
        assert_eq!(stats.total_entries, 5);
        assert_eq!(stats.total_words, 2 + 5 + 0 + 1 + 4);
        let ids: Vec<_> = stats.recent.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![DiaryId(4), DiaryId(2), DiaryId(3)]);
    }

    #[test]
    fn test_no_entries() {
        let stats = ProfileStats::from_diaries(mina(), &[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_words, 0);
        assert!(stats.recent.is_empty());
    }
}
