//! Terminal driver for the reminder engine.
//!
//! # Responsibility
//! - Bootstrap logging, storage and config from the environment.
//! - Run the timer loop on a single-threaded runtime and feed it stdin commands.

mod commands;
mod surface;

use commands::{parse_line, photo_data_uri, CliCommand, HELP};
use log::warn;
use pillcue_core::db::open_db;
use pillcue_core::{
    channel, default_log_level, init_logging, run, Clock, CommandError, EngineConfig,
    EngineHandle, KeyValueStore, MemoryKeyValueStore, ReminderEngine, ReminderStore,
    SqliteKeyValueStore, SystemClock,
};
use std::path::PathBuf;
use surface::TerminalSurface;
use tokio::io::{AsyncBufReadExt, BufReader};

const DB_FILE_NAME: &str = "pillcue.sqlite3";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();

    let log_dir = env_path("PILLCUE_LOG_DIR")
        .unwrap_or_else(|| std::env::temp_dir().join("pillcue-logs"));
    let level = std::env::var("PILLCUE_LOG_LEVEL").unwrap_or_else(|_| default_log_level().into());
    if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    println!("pillcue {}", pillcue_core::core_version());
    let config = EngineConfig::from_env();
    let store = ReminderStore::load(open_backend());
    let clock = SystemClock;
    let mut engine = ReminderEngine::new(store, TerminalSurface, &config, clock.now());

    let (handle, commands) = channel();
    // No camera in a terminal; photos come from files.
    let _ = handle.camera_result(Ok(()));
    tokio::spawn(read_stdin(handle));

    run(&mut engine, clock, &config, commands).await;
}

fn open_backend() -> Box<dyn KeyValueStore> {
    let path = env_path("PILLCUE_DB_PATH").unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
    match open_db(&path) {
        Ok(conn) => Box::new(SqliteKeyValueStore::new(conn)),
        Err(err) => {
            warn!(
                "event=db_open module=cli status=fallback path={} error={}",
                path.display(),
                err
            );
            eprintln!("! storage unavailable ({err}); reminders last until exit");
            Box::new(MemoryKeyValueStore::new())
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

async fn read_stdin(handle: EngineHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                eprintln!("! failed to read input: {err}");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(CliCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(CommandError::Closed) = dispatch(&handle, command).await {
                    return;
                }
            }
            Ok(None) => {}
            Err(message) => println!("! {message}"),
        }
    }
    let _ = handle.shutdown();
}

async fn dispatch(handle: &EngineHandle, command: CliCommand) -> Result<(), CommandError> {
    match command {
        CliCommand::Photo(source) => match photo_data_uri(&source) {
            Ok(uri) => match handle.capture_photo(uri).await {
                Ok(()) => println!("photo captured"),
                Err(CommandError::Closed) => return Err(CommandError::Closed),
                // The engine already surfaced the notice.
                Err(_) => {}
            },
            Err(err) => println!("! cannot read photo `{source}`: {err}"),
        },
        CliCommand::Add(draft) => match handle.add_reminder(draft).await {
            Ok(id) => println!("reminder added ({id})"),
            Err(CommandError::Closed) => return Err(CommandError::Closed),
            Err(_) => {}
        },
        CliCommand::Ack => {
            let outcome = handle.acknowledge().await?;
            if outcome.acknowledged.is_none() {
                println!("no alarm is firing");
            }
        }
        CliCommand::Clear => handle.clear_all()?,
        CliCommand::Help => println!("{HELP}"),
        CliCommand::Quit => {}
    }
    Ok(())
}
