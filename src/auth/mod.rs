pub mod guard;
pub mod jwt;
pub mod login;
pub mod session;

pub use guard::{check_route, GuardDecision, Route};
pub use login::{sign_in, sign_up};
pub use session::SessionStore;
