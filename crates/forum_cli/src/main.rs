//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `forum_core` linkage (`ping`, `version`).
//! - Exercise the full insert path against a real database (`shakedown`).

use clap::{Parser, Subcommand};
use forum_core::{
    db, init_logging, Comment, CommentRepository, ForumConfig, RecordRepository, SqliteStorage,
    User, UserRepository, Vote, VoteRepository,
};
use mockable::DefaultClock;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forum", version, about = "Forum store smoke tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the core health-check response.
    Ping,
    /// Print the core crate version.
    Version,
    /// Insert a user, a comment and a vote, then print them.
    Shakedown {
        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// SQLite database file; overrides the config's database path.
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Ping => println!("forum_core ping={}", forum_core::ping()),
        Command::Version => println!("forum_core version={}", forum_core::core_version()),
        Command::Shakedown { config, db } => shakedown(config, db)?,
    }
    Ok(())
}

fn shakedown(config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut config = match config_path {
        Some(path) => ForumConfig::load(path)?,
        None => ForumConfig::default(),
    };
    if db_path.is_some() {
        config.database.path = db_path;
    }
    if config.logging.dir.is_some() {
        init_logging(&config.logging)?;
    }

    let conn = db::open_with_config(&config.database)?;
    let storage = SqliteStorage::try_new(&conn)?;
    let clock = DefaultClock;

    let mut user = User::new(None::<i64>, "shakedown@example.com", "shakedown")?;
    UserRepository::new(&storage).insert(&mut user)?;

    let author_id = user.user_id().ok_or("user insert did not assign an id")?;
    let mut comment = Comment::new(
        None::<i64>,
        author_id,
        "yay! object oriented!",
        None::<&str>,
        &clock,
    )?;
    CommentRepository::new(&storage).insert(&mut comment)?;

    let comment_id = comment.comment_id().ok_or("comment insert did not assign an id")?;
    let mut vote = Vote::new(author_id, comment_id, None::<&str>, 1, &clock)?;
    VoteRepository::new(&storage).insert(&mut vote)?;

    println!("{user:#?}");
    println!("{comment:#?}");
    println!("{vote:#?}");
    Ok(())
}
