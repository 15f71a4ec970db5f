use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use sess_repo::{
    JournalConfig, JournaledDocumentStore, Scope, Session, SessionRepository, SessionType,
};
use sess_server::{ServerConfig, SessionServer};

use crate::cli::*;

const DEFAULT_JOURNAL: &str = "sessions.journal";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let journal = cli.journal;
    match cli.command {
        Command::Serve(args) => cmd_serve(args, journal),
        Command::Types => cmd_types(format),
        command => {
            let path = journal.unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL));
            let local = LocalStore::open(&path)?;
            run_local(&local, command, format)
        }
    }
}

/// A repository over a journal file, for the offline commands.
struct LocalStore {
    store: Arc<JournaledDocumentStore>,
    repo: SessionRepository,
}

impl LocalStore {
    fn open(path: &Path) -> anyhow::Result<Self> {
        let store = JournaledDocumentStore::open(path, JournalConfig::default())
            .with_context(|| format!("opening journal {}", path.display()))?;
        tracing::debug!(path = %path.display(), sessions = store.len(), "opened local store");
        let store = Arc::new(store);
        let repo = SessionRepository::new(store.clone());
        Ok(Self { store, repo })
    }
}

fn run_local(local: &LocalStore, command: Command, format: OutputFormat) -> anyhow::Result<()> {
    let repo = &local.repo;
    match command {
        Command::Create(args) => {
            let scope = scope(&args.scope)?;
            let body = data_or_stdin(args.data)?;
            let session = repo.create(&scope, body.as_deref())?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "id": session.id }))?,
                OutputFormat::Text => println!(
                    "{} Stored {} in {}",
                    "✓".green().bold(),
                    session.id.to_string().yellow(),
                    scope.to_string().cyan()
                ),
            }
            Ok(())
        }
        Command::Get(args) => {
            let session = repo.get_by_id(&scope(&args.scope)?, &args.id)?;
            print_sessions(std::slice::from_ref(&session), format)
        }
        Command::List(args) => print_sessions(&repo.list_all(&scope(&args)?)?, format),
        Command::Query(args) => {
            let found = repo.get_by_field(&scope(&args.scope)?, &args.field, &args.value)?;
            print_sessions(&found, format)
        }
        Command::Fetch(args) => {
            let found = repo.fetch_by_query(&scope(&args.scope)?, &args.filter)?;
            print_sessions(&found, format)
        }
        Command::Update(args) => {
            let scope = scope(&args.scope)?;
            let body = data_or_stdin(args.data)?;
            let session = repo.replace(&scope, &args.id, body.as_deref())?;
            if format == OutputFormat::Text {
                println!("{} Updated {}", "✓".green().bold(), session.id.to_string().yellow());
            }
            Ok(())
        }
        Command::Delete(args) => {
            repo.delete(&scope(&args.scope)?, &args.id)?;
            if format == OutputFormat::Text {
                println!("{} Deleted {}", "✓".green().bold(), args.id.yellow());
            }
            Ok(())
        }
        Command::Compact => {
            let reclaimed = local.store.compact()?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "documents": local.store.len(),
                    "reclaimed_bytes": reclaimed,
                }))?,
                OutputFormat::Text => println!(
                    "{} Compacted: {} sessions, {} bytes reclaimed",
                    "✓".green().bold(),
                    local.store.len().to_string().bold(),
                    reclaimed
                ),
            }
            Ok(())
        }
        Command::Serve(_) | Command::Types => {
            anyhow::bail!("command does not run against a local store")
        }
    }
}

fn cmd_serve(args: ServeArgs, journal: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }
    if journal.is_some() {
        config.journal_path = journal;
    }

    let server = SessionServer::new(config)?;
    println!(
        "Session server on {} ({})",
        server.config().bind_addr.to_string().bold(),
        match &server.config().journal_path {
            Some(path) => format!("journal: {}", path.display()),
            None => "in-memory".to_string(),
        }
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_types(format: OutputFormat) -> anyhow::Result<()> {
    let names: Vec<&str> = SessionType::ALL.iter().map(|t| t.as_str()).collect();
    match format {
        OutputFormat::Json => print_json(&names)?,
        OutputFormat::Text => {
            for name in names {
                println!("{}", name.cyan());
            }
        }
    }
    Ok(())
}

fn scope(args: &ScopeArgs) -> anyhow::Result<Scope> {
    Scope::parse(&args.source, &args.kind)
        .with_context(|| format!("invalid scope {}/{}", args.source, args.kind))
}

fn data_or_stdin(data: Option<String>) -> anyhow::Result<Option<String>> {
    if data.is_some() {
        return Ok(data);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading session data from stdin")?;
    Ok(Some(buf))
}

fn print_sessions(sessions: &[Session], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&sessions)?,
        OutputFormat::Text => {
            if sessions.is_empty() {
                println!("No sessions.");
            }
            for session in sessions {
                println!(
                    "{}  {}",
                    session.id.to_string().yellow().bold(),
                    session.scope().to_string().cyan()
                );
                println!("  {}", serde_json::Value::Object(session.data.clone()));
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
