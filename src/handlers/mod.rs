//! One function per CLI command. Each returns the text to print so the
//! binary stays a thin dispatcher.

pub mod auth;
pub mod diaries;
pub mod insights;
pub mod voice;
