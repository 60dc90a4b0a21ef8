use std::fmt;
use std::sync::Arc;

use quiz_core::model::ViewMode;
use services::{AppServices, Clock};
use storage::content::DirectoryContent;
use storage::repository::Storage;

mod play;
mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingCategory,
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingCategory => write!(f, "quiz requires a category id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected quiz or review)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- home [--db <sqlite_url>] [--content <dir>]");
    eprintln!(
        "  cargo run -p app -- quiz <category-id> [--mode quiz|review] [--db <sqlite_url>] [--content <dir>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --content content");
    eprintln!("  --mode quiz");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CONTENT_DIR, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Home,
    Quiz { category_id: String, mode: ViewMode },
}

struct Args {
    db_url: String,
    content_dir: String,
    command: Command,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut content_dir =
            std::env::var("QUIZ_CONTENT_DIR").unwrap_or_else(|_| "content".into());

        let mut args = argv.into_iter().peekable();
        let is_quiz = match args.peek().map(String::as_str) {
            Some("quiz") => {
                args.next();
                true
            }
            Some("home") => {
                args.next();
                false
            }
            _ => false,
        };

        let mut category_id = None;
        let mut mode = ViewMode::Quiz;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => content_dir = require_value(&mut args, "--content")?,
                "--mode" if is_quiz => {
                    let value = require_value(&mut args, "--mode")?;
                    mode = match value.parse::<ViewMode>() {
                        Ok(parsed @ (ViewMode::Quiz | ViewMode::Review)) => parsed,
                        _ => return Err(ArgsError::InvalidMode { raw: value }),
                    };
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if is_quiz && category_id.is_none() && !arg.starts_with("--") => {
                    category_id = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = if is_quiz {
            Command::Quiz {
                category_id: category_id.ok_or(ArgsError::MissingCategory)?,
                mode,
            }
        } else {
            Command::Home
        };

        Ok(Self {
            db_url,
            content_dir,
            command,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match argv.first().map(String::as_str) {
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if !first.starts_with("--") && !matches!(first, "home" | "quiz") => {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            return Err(ArgsError::UnknownArg(first.to_owned()).into());
        }
        _ => {}
    }

    let parsed = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup so the services only see repository traits.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let content = Arc::new(DirectoryContent::new(&parsed.content_dir));
    log::debug!(
        "db={} content={}",
        parsed.db_url,
        content.root().display()
    );
    let app = AppServices::new(&storage, content, Clock::system())?;

    match parsed.command {
        Command::Home => {
            let home = app.catalog().home().await?;
            render::home(&home);
            Ok(())
        }
        Command::Quiz { category_id, mode } => play::run(&app, &category_id, mode).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn home_is_the_default_command() {
        let parsed = Args::parse(args(&["--content", "bundle"])).unwrap();
        assert_eq!(parsed.command, Command::Home);
        assert_eq!(parsed.content_dir, "bundle");
    }

    #[test]
    fn quiz_takes_category_and_mode() {
        let parsed = Args::parse(args(&["quiz", "A001", "--mode", "review"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Quiz {
                category_id: "A001".into(),
                mode: ViewMode::Review
            }
        );
    }

    #[test]
    fn quiz_rejects_pseudo_modes_and_missing_ids() {
        assert!(matches!(
            Args::parse(args(&["quiz", "A001", "--mode", "mock"])),
            Err(ArgsError::InvalidMode { .. })
        ));
        assert!(matches!(
            Args::parse(args(&["quiz"])),
            Err(ArgsError::MissingCategory)
        ));
        assert!(matches!(
            Args::parse(args(&["home", "extra"])),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert!(normalize_sqlite_url("sqlite:quiz.sqlite3".into()).starts_with("sqlite:///"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
    }
}
