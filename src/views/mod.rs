//! Read-only summaries built from the diary list.

pub mod calendar;
pub mod insights;
pub mod profile;

pub use calendar::MonthView;
pub use insights::SentimentOverview;
pub use profile::ProfileStats;
