use crate::auth::session::SessionStore;
use crate::models::DiaryId;

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    DiaryList,
    DiaryNew,
    DiaryDetail(DiaryId),
    DiaryEdit(DiaryId),
    Voice(Option<DiaryId>),
    Calendar,
    Analysis,
    Profile,
}

impl Route {
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::DiaryList => "/diary".into(),
            Route::DiaryNew => "/diary/new".into(),
            Route::DiaryDetail(id) => format!("/diary/{}", id),
            Route::DiaryEdit(id) => format!("/diary/{}/edit", id),
            Route::Voice(None) => "/diary/voice".into(),
            Route::Voice(Some(id)) => format!("/diary/voice?id={}", id),
            Route::Calendar => "/calendar".into(),
            Route::Analysis => "/analysis".into(),
            Route::Profile => "/profile".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether `route` may be entered with the current session.
///
/// Signed-in users are bounced off the login and register screens; anonymous
/// users are sent to login from everywhere else.
pub fn check_route(route: Route, session: &SessionStore) -> GuardDecision {
    let signed_in = session.is_authenticated();
    match (route.is_public(), signed_in) {
        (true, true) => {
            tracing::debug!(path = %route.path(), "Already signed in, redirecting to diary list");
            GuardDecision::Redirect(Route::DiaryList)
        }
        (false, false) => {
            tracing::debug!(path = %route.path(), "Not signed in, redirecting to login");
            GuardDecision::Redirect(Route::Login)
        }
        _ => GuardDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn signed_in() -> SessionStore {
        let mut store = SessionStore::in_memory();
        store
            .login(
                "opaque-token",
                User {
                    id: 1,
                    username: "mina".into(),
                    email: String::new(),
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_anonymous_redirected_to_login() {
        let store = SessionStore::in_memory();
        assert_eq!(
            check_route(Route::Voice(Some(DiaryId(3))), &store),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(check_route(Route::Calendar, &store), GuardDecision::Redirect(Route::Login));
    }

    #[test]
    fn test_anonymous_may_log_in() {
        let store = SessionStore::in_memory();
        assert_eq!(check_route(Route::Login, &store), GuardDecision::Allow);
        assert_eq!(check_route(Route::Register, &store), GuardDecision::Allow);
    }

    #[test]
    fn test_signed_in_bounced_from_login() {
        let store = signed_in();
        assert_eq!(
            check_route(Route::Login, &store),
            GuardDecision::Redirect(Route::DiaryList)
        );
        assert_eq!(check_route(Route::DiaryEdit(DiaryId(2)), &store), GuardDecision::Allow);
    }

    #[test]
    fn test_paths() {
        assert_eq!(Route::DiaryEdit(DiaryId(5)).path(), "/diary/5/edit");
        assert_eq!(Route::Voice(Some(DiaryId(5))).path(), "/diary/voice?id=5");
        assert_eq!(Route::Profile.path(), "/profile");
    }
}
