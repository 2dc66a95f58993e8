use chrono::Local;
use clap::Parser;

use record_client::api::HttpDiaryClient;
use record_client::auth::{check_route, GuardDecision, Route, SessionStore};
use record_client::cli::{Cli, Command, DiaryCommand, VoiceCommand};
use record_client::config::{Config, LogFormat};
use record_client::error::{ClientError, ClientResult};
use record_client::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "record_client=info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "Configuration loaded");

    let mut session = SessionStore::init(&config.session_file)?;
    let result = run(cli.command, &config, &mut session).await;
    session.teardown();

    match result {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) if e.requires_login() => {
            eprintln!("Not signed in or session expired. Run `record login` first.");
            std::process::exit(2);
        }
        Err(e) => {
            if e.is_retryable() {
                eprintln!("{}. Please try again.", e);
            } else {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    }
}

async fn run(command: Command, config: &Config, session: &mut SessionStore) -> ClientResult<String> {
    if !command.manages_session() {
        match check_route(command.route(), session) {
            GuardDecision::Allow => {}
            GuardDecision::Redirect(Route::Login) => return Err(ClientError::Unauthorized),
            GuardDecision::Redirect(_) => {
                let name = session
                    .current_user()
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                return Ok(format!("Already signed in as {}. Run `record logout` first.", name));
            }
        }
    }

    let client = HttpDiaryClient::new(config)?.with_session(session);

    match command {
        Command::Login { username, password } => {
            handlers::auth::login(&client, session, username, password).await
        }
        Command::Register {
            username,
            email,
            password,
        } => handlers::auth::register(&client, session, username, email, password).await,
        Command::Logout => handlers::auth::logout(session),
        Command::Whoami => Ok(handlers::auth::whoami(session)),
        Command::Profile => handlers::auth::profile(&client, session).await,
        Command::Diary(cmd) => match cmd {
            DiaryCommand::List => handlers::diaries::list(&client).await,
            DiaryCommand::Show { id } => handlers::diaries::show(&client, id).await,
            DiaryCommand::New {
                title,
                content,
                date,
                periods,
            } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                handlers::diaries::create(&client, title, content, date, periods).await
            }
            DiaryCommand::Edit {
                id,
                title,
                content,
                date,
                periods,
            } => handlers::diaries::edit(&client, id, title, content, date, periods).await,
            DiaryCommand::Delete { id } => handlers::diaries::delete(&client, id).await,
            DiaryCommand::Analyze { id } => handlers::diaries::analyze(&client, id).await,
        },
        Command::Voice(cmd) => match cmd {
            VoiceCommand::Status { id } => handlers::voice::status(client, id).await,
            VoiceCommand::Submit {
                audio,
                diary,
                target,
                date,
            } => handlers::voice::submit(client, &audio, diary, target, date).await,
        },
        Command::Calendar { year, month } => {
            let (year, month) = match (year, month) {
                (Some(y), Some(m)) => (y, m),
                _ => handlers::insights::current_month(Local::now().date_naive()),
            };
            handlers::insights::calendar(&client, year, month).await
        }
        Command::Insights => handlers::insights::insights(&client).await,
    }
}
