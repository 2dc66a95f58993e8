use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::auth::Route;
use crate::models::{CaptureTarget, DiaryId};

/// RecorD journaling client
#[derive(Parser, Debug)]
#[command(name = "record", author, version, about, long_about = None)]
pub struct Cli {
    /// Override the API base URL (defaults to RECORD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Account summary with entry and word counts
    Profile,
    /// Written diary entries
    #[command(subcommand)]
    Diary(DiaryCommand),
    /// Voice diary capture and completion
    #[command(subcommand)]
    Voice(VoiceCommand),
    /// Month grid of entries
    Calendar {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
    /// Mood and keyword overview across analyzed entries
    Insights,
}

#[derive(Subcommand, Debug)]
pub enum DiaryCommand {
    /// List all entries
    List,
    /// Show one entry with its analysis
    Show { id: DiaryId },
    /// Write a new entry
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Entry date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        periods: PeriodArgs,
    },
    /// Change fields of an entry
    Edit {
        id: DiaryId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        periods: PeriodArgs,
    },
    /// Delete an entry
    Delete { id: DiaryId },
    /// Request sentiment analysis for an entry
    Analyze { id: DiaryId },
}

#[derive(Args, Debug, Default)]
pub struct PeriodArgs {
    #[arg(long)]
    pub morning: Option<String>,
    #[arg(long)]
    pub afternoon: Option<String>,
    #[arg(long)]
    pub evening: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum VoiceCommand {
    /// Show what an entry still needs
    Status { id: DiaryId },
    /// Submit a WAV recording as a new entry or a supplement
    Submit {
        /// WAV file played back as the microphone
        #[arg(long)]
        audio: PathBuf,
        /// Existing entry to supplement
        #[arg(long)]
        diary: Option<DiaryId>,
        /// morning, afternoon, evening, general or question_response
        #[arg(long)]
        target: Option<CaptureTarget>,
        /// Date for a new entry (YYYY-MM-DD), defaults to today
        #[arg(long, conflicts_with = "diary")]
        date: Option<NaiveDate>,
    },
}

impl Command {
    /// The screen this command stands for, used by the route guard.
    pub fn route(&self) -> Route {
        match self {
            Command::Login { .. } | Command::Logout | Command::Whoami => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Diary(DiaryCommand::List) => Route::DiaryList,
            Command::Diary(DiaryCommand::New { .. }) => Route::DiaryNew,
            Command::Diary(DiaryCommand::Show { id })
            | Command::Diary(DiaryCommand::Delete { id })
            | Command::Diary(DiaryCommand::Analyze { id }) => Route::DiaryDetail(*id),
            Command::Diary(DiaryCommand::Edit { id, .. }) => Route::DiaryEdit(*id),
            Command::Voice(VoiceCommand::Status { id }) => Route::Voice(Some(*id)),
            Command::Voice(VoiceCommand::Submit { diary, .. }) => Route::Voice(*diary),
            Command::Calendar { .. } => Route::Calendar,
            Command::Insights => Route::Analysis,
            Command::Profile => Route::Profile,
        }
    }

    /// Commands that manage the session itself bypass the route guard.
    pub fn manages_session(&self) -> bool {
        matches!(self, Command::Logout | Command::Whoami)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    #[test]
    fn test_parse_voice_submit() {
        let cli = Cli::try_parse_from([
            "record", "voice", "submit", "--audio", "clip.wav", "--diary", "7", "--target",
            "evening",
        ])
        .unwrap();
        match cli.command {
            Command::Voice(VoiceCommand::Submit {
                diary, target, ..
            }) => {
                assert_eq!(diary, Some(DiaryId(7)));
                assert_eq!(target, Some(CaptureTarget::Period(Period::Evening)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_calendar_needs_both_year_and_month() {
        assert!(Cli::try_parse_from(["record", "calendar", "--year", "2026"]).is_err());
        assert!(Cli::try_parse_from(["record", "calendar", "--year", "2026", "--month", "3"]).is_ok());
    }

    #[test]
    fn test_routes() {
        let cli = Cli::try_parse_from(["record", "diary", "edit", "4", "--title", "x"]).unwrap();
        assert_eq!(cli.command.route(), Route::DiaryEdit(DiaryId(4)));
        let cli = Cli::try_parse_from(["record", "insights"]).unwrap();
        assert_eq!(cli.command.route(), Route::Analysis);
        let cli = Cli::try_parse_from(["record", "profile"]).unwrap();
        assert_eq!(cli.command.route(), Route::Profile);
        assert!(!cli.command.manages_session());
    }

    #[test]
    fn test_entry_date_only_for_new_entries() {
        let err = Cli::try_parse_from([
            "record", "voice", "submit", "--audio", "clip.wav", "--diary", "7", "--date",
            "2026-03-02",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from([
            "record", "voice", "submit", "--audio", "clip.wav", "--date", "2026-03-02",
        ])
        .unwrap();
        match cli.command {
            Command::Voice(VoiceCommand::Submit { diary, date, .. }) => {
                assert_eq!(diary, None);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
