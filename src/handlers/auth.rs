use std::fmt::Write;

use crate::api::DiaryService;
use crate::auth::{sign_in, sign_up, SessionStore};
use crate::dto::{LoginRequest, RegisterRequest};
use crate::error::ClientResult;
use crate::views::ProfileStats;

pub async fn login<S: DiaryService + ?Sized>(
    service: &S,
    session: &mut SessionStore,
    username: String,
    password: String,
) -> ClientResult<String> {
    let user = sign_in(service, session, &LoginRequest { username, password }).await?;
    Ok(format!("Signed in as {}", user.username))
}

pub async fn register<S: DiaryService + ?Sized>(
    service: &S,
    session: &mut SessionStore,
    username: String,
    email: String,
    password: String,
) -> ClientResult<String> {
    let req = RegisterRequest {
        username,
        email,
        password,
    };
    match sign_up(service, session, &req).await? {
        Some(user) => Ok(format!("Registered and signed in as {}", user.username)),
        None => Ok(format!(
            "Registered {}. Run `record login` to sign in.",
            req.username
        )),
    }
}

pub fn logout(session: &mut SessionStore) -> ClientResult<String> {
    let name = session.current_user().map(|u| u.username.clone());
    session.logout()?;
    Ok(match name {
        Some(name) => format!("Signed out {}", name),
        None => "Not signed in".to_string(),
    })
}

pub fn whoami(session: &SessionStore) -> String {
    match session.current_user() {
        Some(user) if user.email.is_empty() => format!("{} (id {})", user.username, user.id),
        Some(user) => format!("{} <{}> (id {})", user.username, user.email, user.id),
        None => "Not signed in".to_string(),
    }
}

pub async fn profile<S: DiaryService + ?Sized>(
    service: &S,
    session: &SessionStore,
) -> ClientResult<String> {
    let user = session.require_user()?.clone();
    let diaries = service.list_diaries().await?;
    Ok(render_profile(&ProfileStats::from_diaries(user, &diaries)))
}

fn render_profile(stats: &ProfileStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", stats.user.username);
    if !stats.user.email.is_empty() {
        let _ = writeln!(out, "{}", stats.user.email);
    }
    let _ = writeln!(out, "{} entries, {} words written", stats.total_entries, stats.total_words);

    if stats.recent.is_empty() {
        out.push_str("\nNo entries yet. Start with `record diary new` or `record voice submit`.\n");
        return out;
    }
    out.push_str("\nRecent entries\n");
    for diary in &stats.recent {
        let preview = diary.content.lines().next().unwrap_or("").trim();
        let _ = writeln!(
            out,
            "  #{} {}  {}",
            diary.id,
            diary.date.format("%B %-d, %Y"),
            if preview.is_empty() { "No content" } else { preview }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiaryEntry, User};
    use serde_json::json;

    #[test]
    fn test_whoami_and_logout() {
        let mut session = SessionStore::in_memory();
        assert_eq!(whoami(&session), "Not signed in");

        session
            .login(
                "opaque",
                User {
                    id: 3,
                    username: "mina".into(),
                    email: "m@example.com".into(),
                },
            )
            .unwrap();
        assert_eq!(whoami(&session), "mina <m@example.com> (id 3)");
        assert_eq!(logout(&mut session).unwrap(), "Signed out mina");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_render_profile() {
        let diaries: Vec<DiaryEntry> = serde_json::from_value(json!([
            { "id": 1, "title": "a", "content": "Quiet morning with tea", "date": "2026-03-01" },
            { "id": 2, "title": "b", "content": null, "date": "2026-03-04" }
        ]))
        .unwrap();
        let user = User {
            id: 3,
            username: "mina".into(),
            email: String::new(),
        };

        let text = render_profile(&ProfileStats::from_diaries(user, &diaries));
        assert!(text.starts_with("mina\n2 entries, 4 words written"));
        assert!(text.contains("  #2 March 4, 2026  No content"));
        assert!(text.contains("  #1 March 1, 2026  Quiet morning with tea"));
    }
}
