//! RecorD client: diary CRUD, voice capture, and the completion tracker that
//! walks a voice diary from first recording to a finished entry.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod views;
pub mod voice;

pub use api::{DiaryService, HttpDiaryClient};
pub use config::Config;
pub use error::{ClientError, ClientResult};
