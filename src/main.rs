// SPDX-License-Identifier: MIT
//! The Philograph CLI — the user-facing collaborator over the forum core.
//!
//! Identity is started and stopped explicitly; every other subcommand acts
//! as the stored session's user. Mutations retry version conflicts a couple
//! of times (reload-and-reapply) before surfacing them.

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use philograph::config::{Config, StoreKind};
use philograph::retry::{retry_on_conflict, RetryConfig};
use philograph::{ForumError, Proposition, Repository, Session};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "philograph",
    about = "Philograph — a minimal forum for philosophical propositions",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Data directory for the session file, config, and local blob
    #[arg(long, env = "PHILOGRAPH_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Store backend: memory, file, or github
    #[arg(long, env = "PHILOGRAPH_STORE")]
    store: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "PHILOGRAPH_LOG")]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start, stop, or show the acting identity.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Post a new proposition.
    Post {
        /// The proposition text
        content: String,
    },
    /// Reply to a proposition.
    Reply {
        /// Proposition id (8 hex chars)
        id: String,
        /// The reply text
        content: String,
    },
    /// Evaluate a reply.
    Evaluate {
        /// Proposition id (8 hex chars)
        id: String,
        /// Zero-based reply index as shown by `list`
        index: usize,
        /// The evaluation text
        text: String,
    },
    /// List all propositions, newest first.
    List {
        /// Emit the raw JSON instead of the human rendering
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Mint a new researcher label and store it as the active session.
    Start,
    /// Forget the active session.
    Stop,
    /// Show the active session, if any.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let store_kind = args
        .store
        .as_deref()
        .map(str::parse::<StoreKind>)
        .transpose()?;
    let config = Config::new(args.data_dir, store_kind, args.log)?;

    tracing_subscriber::fmt()
        .with_env_filter(config.log.clone())
        .with_writer(std::io::stderr)
        .compact()
        .init();
    debug!(store = ?config.store, data_dir = %config.data_dir.display(), "configured");

    match run(&args.command, &config).await {
        Err(e) if e.downcast_ref::<ForumError>().is_some_and(|f| matches!(f, ForumError::Conflict)) => {
            bail!("{e}\nAnother session committed first. Re-run the command to apply your change against the latest revision.")
        }
        other => other,
    }
}

async fn run(command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::Session { action } => run_session(action, config),
        Command::Post { content } => {
            let (repo, session) = open(config)?;
            let proposition = retry_on_conflict(&RetryConfig::default(), || {
                repo.create_proposition(&session, content)
            })
            .await?;
            println!("Posted proposition {} as {}", proposition.id, session.user);
            Ok(())
        }
        Command::Reply { id, content } => {
            let (repo, session) = open(config)?;
            retry_on_conflict(&RetryConfig::default(), || {
                repo.add_reply(&session, id, content)
            })
            .await?;
            println!("Replied to {id} as {}", session.user);
            Ok(())
        }
        Command::Evaluate { id, index, text } => {
            let (repo, session) = open(config)?;
            retry_on_conflict(&RetryConfig::default(), || {
                repo.add_evaluation(&session, id, *index, text)
            })
            .await?;
            println!("Evaluated reply {index} of {id} as {}", session.user);
            Ok(())
        }
        Command::List { json } => {
            let repo = Repository::new(config.build_store()?);
            let mut propositions = repo.list_propositions().await?;
            propositions.reverse(); // newest first
            if *json {
                println!("{}", serde_json::to_string_pretty(&propositions)?);
            } else if propositions.is_empty() {
                println!("No propositions yet.");
            } else {
                for p in &propositions {
                    print_proposition(p);
                }
            }
            Ok(())
        }
    }
}

fn run_session(action: &SessionAction, config: &Config) -> Result<()> {
    match action {
        SessionAction::Start => {
            let session = Session::start();
            session.save_to(&config.data_dir)?;
            println!("Session started as {}", session.user);
        }
        SessionAction::Stop => {
            Session::clear(&config.data_dir)?;
            println!("Session stopped.");
        }
        SessionAction::Status => match Session::load_from(&config.data_dir)? {
            Some(session) => println!("Active session: {}", session.user),
            None => println!("No active session."),
        },
    }
    Ok(())
}

/// Build the repository and require an active session for a mutation.
fn open(config: &Config) -> Result<(Repository, Session)> {
    let session = Session::load_from(&config.data_dir)?
        .context("no active session — run `philograph session start` first")?;
    Ok((Repository::new(config.build_store()?), session))
}

fn print_proposition(p: &Proposition) {
    println!("[{}] {} · {}", p.id, p.author, p.time);
    println!("    {}", p.content);
    for (i, reply) in p.replies.iter().enumerate() {
        println!("    #{i} {}: {}", reply.author, reply.content);
        for ev in &reply.evaluations {
            println!("        · {}", ev.display_string());
        }
    }
    println!();
}
