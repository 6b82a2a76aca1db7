//! Tonesmith CLI
//!
//! Command-line interface for tonesmith - tone-of-voice copy rewriting
//! with per-project history and likes.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tonesmith_core::{Config, Length, OpenAiGenerator, StorageError, Store, Strength};

mod commands;
mod editor;
mod output;

use commands::generate::{GenerateArgs, RegenerateArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tonesmith")]
#[command(about = "Tonesmith - Rewrite marketing copy in your tone of voice")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: Option<ProjectCommands>,
    },
    /// Show or set the global tone of voice
    Tone {
        #[command(subcommand)]
        command: Option<ToneCommands>,
    },
    /// Generate rewritten copy
    #[command(alias = "gen")]
    Generate {
        /// Text to rewrite ("-" reads stdin)
        #[arg(short, long)]
        input: Option<String>,
        /// Extra instructions for this generation
        #[arg(short = 'I', long)]
        instructions: Option<String>,
        /// Target length (short, medium, long)
        #[arg(short, long, default_value_t = Length::default())]
        length: Length,
        /// Rewrite strength (subtle, balanced, strong)
        #[arg(short, long, default_value_t = Strength::default())]
        strength: Strength,
        /// Project to record into (defaults to the active project)
        #[arg(short, long)]
        project: Option<String>,
        /// Continue an existing session id instead of starting a new one
        #[arg(long)]
        session: Option<String>,
        /// Print the prompt without generating or saving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate a new version of a session from one of its versions
    #[command(disable_version_flag = true)]
    Regenerate {
        /// Session ID (full ID or prefix)
        #[arg(long)]
        session: String,
        /// Version to rerun (defaults to the latest)
        #[arg(long)]
        version: Option<usize>,
        /// Override the target length
        #[arg(short, long)]
        length: Option<Length>,
        /// Override the rewrite strength
        #[arg(short, long)]
        strength: Option<Strength>,
        /// Project (defaults to the active project)
        #[arg(short, long)]
        project: Option<String>,
    },
    /// List sessions, or show one session
    History {
        /// Project (defaults to the active project)
        #[arg(short, long, global = true)]
        project: Option<String>,
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
    /// Like a version of a session
    #[command(disable_version_flag = true)]
    Like {
        /// Session ID (full ID or prefix)
        #[arg(long)]
        session: String,
        /// Version number (defaults to the latest)
        #[arg(long)]
        version: Option<usize>,
        /// Project (defaults to the active project)
        #[arg(short, long)]
        project: Option<String>,
    },
    /// List liked items
    Likes {
        /// Project (defaults to the active project)
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (state file, counts, API key)
    Status,
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List all projects
    #[command(alias = "ls")]
    List,
    /// Create a project and make it active
    #[command(alias = "add")]
    Create {
        /// Project name
        name: String,
    },
    /// Delete a project with its history and likes
    #[command(alias = "rm")]
    Delete {
        /// Project name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Switch the active project
    Use {
        /// Project name
        name: String,
    },
    /// Show the active project
    Current,
}

#[derive(Subcommand)]
enum ToneCommands {
    /// Show the tone of voice
    Show,
    /// Replace the tone of voice (opens $EDITOR without text or --file)
    Set {
        /// New tone of voice text
        text: Option<String>,
        /// Read the tone of voice from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Show every version in a session
    Show {
        /// Session ID (full ID or prefix)
        session: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, model, api_key, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = recovery_hint(&e) {
                eprintln!();
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let store = Store::open_with_config(config)?;

    match cli.command {
        Commands::Project { command } => handle_project_command(command, &store, output),
        Commands::Tone { command } => match command {
            Some(ToneCommands::Show) | None => commands::tone::show(&store, output),
            Some(ToneCommands::Set { text, file }) => {
                commands::tone::set(&store, text, file, output)
            }
        },
        Commands::Generate {
            input,
            instructions,
            length,
            strength,
            project,
            session,
            dry_run,
        } => {
            let generator = OpenAiGenerator::new(store.config().generation.clone());
            let args = GenerateArgs {
                input,
                instructions,
                length,
                strength,
                project,
                session,
                dry_run,
            };
            commands::generate::generate(&store, &generator, args, output)
        }
        Commands::Regenerate {
            session,
            version,
            length,
            strength,
            project,
        } => {
            let generator = OpenAiGenerator::new(store.config().generation.clone());
            let args = RegenerateArgs {
                session,
                version,
                length,
                strength,
                project,
            };
            commands::generate::regenerate(&store, &generator, args, output)
        }
        Commands::History { project, command } => match command {
            None => commands::history::list(&store, project, output),
            Some(HistoryCommands::Show { session }) => {
                commands::history::show(&store, project, session, output)
            }
        },
        Commands::Like {
            session,
            version,
            project,
        } => commands::history::like(&store, project, session, version, output),
        Commands::Likes { project } => commands::history::likes(&store, project, output),
        Commands::Status => commands::status::show(&store, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_project_command(
    command: Option<ProjectCommands>,
    store: &Store,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ProjectCommands::List) | None => commands::project::list(store, output),
        Some(ProjectCommands::Create { name }) => commands::project::create(store, name, output),
        Some(ProjectCommands::Delete { name, yes }) => {
            commands::project::delete(store, name, yes, output)
        }
        Some(ProjectCommands::Use { name }) => commands::project::use_project(store, name, output),
        Some(ProjectCommands::Current) => commands::project::current(store, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Recovery advice for the first storage error in the chain
///
/// Errors the user can fix in place are prefixed with the reassurance
/// that nothing was lost.
fn recovery_hint(error: &anyhow::Error) -> Option<String> {
    let storage = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())?;
    let suggestion = storage.recovery_suggestion()?;

    if storage.is_recoverable() {
        Some(format!("Your saved data is unchanged. {}", suggestion))
    } else {
        Some(suggestion.to_string())
    }
}

/// Initialize file logging when TONESMITH_LOG is set
fn init_logging(config: &Config) {
    // Only log if TONESMITH_LOG is set
    let Ok(log_level) = std::env::var("TONESMITH_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "tonesmith_core={},tonesmith_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "tonesmith",
            "--json",
            "generate",
            "-i",
            "Our app saves time",
            "--length",
            "Short",
            "-s",
            "strong",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Generate {
                input,
                length,
                strength,
                dry_run,
                session,
                ..
            } => {
                assert_eq!(input.as_deref(), Some("Our app saves time"));
                assert_eq!(length, Length::Short);
                assert_eq!(strength, Strength::Strong);
                assert!(dry_run);
                assert!(session.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["tonesmith", "generate", "-I", "a tagline"]).unwrap();
        match cli.command {
            Commands::Generate {
                length, strength, ..
            } => {
                assert_eq!(length, Length::Medium);
                assert_eq!(strength, Strength::Balanced);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_invalid_length_rejected() {
        assert!(Cli::try_parse_from(["tonesmith", "generate", "-l", "huge"]).is_err());
    }

    #[test]
    fn test_parse_like_version() {
        let cli =
            Cli::try_parse_from(["tonesmith", "like", "--session", "abc", "--version", "2"])
                .unwrap();
        match cli.command {
            Commands::Like {
                session, version, ..
            } => {
                assert_eq!(session, "abc");
                assert_eq!(version, Some(2));
            }
            _ => panic!("expected like"),
        }
    }

    #[test]
    fn test_parse_regenerate_version() {
        let cli = Cli::try_parse_from([
            "tonesmith",
            "regenerate",
            "--session",
            "abc",
            "--version",
            "1",
            "-s",
            "subtle",
        ])
        .unwrap();
        match cli.command {
            Commands::Regenerate {
                session,
                version,
                strength,
                length,
                ..
            } => {
                assert_eq!(session, "abc");
                assert_eq!(version, Some(1));
                assert_eq!(strength, Some(Strength::Subtle));
                assert!(length.is_none());
            }
            _ => panic!("expected regenerate"),
        }
    }

    #[test]
    fn test_history_show_with_global_project() {
        let cli =
            Cli::try_parse_from(["tonesmith", "history", "show", "abc", "--project", "Acme"])
                .unwrap();
        match cli.command {
            Commands::History {
                project,
                command: Some(HistoryCommands::Show { session }),
            } => {
                assert_eq!(project.as_deref(), Some("Acme"));
                assert_eq!(session, "abc");
            }
            _ => panic!("expected history show"),
        }
    }

    #[test]
    fn test_recovery_hint_found_through_context() {
        let err = anyhow::Error::new(StorageError::DiskFull {
            path: PathBuf::from("/tmp/state.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
        })
        .context("Failed to save generation");
        let hint = recovery_hint(&err).unwrap();
        assert!(hint.starts_with("Your saved data is unchanged."));
        assert!(hint.contains("Free up disk space"));

        let rename = anyhow::Error::new(StorageError::AtomicWriteFailed {
            from: PathBuf::from("/tmp/.tmpabc"),
            to: PathBuf::from("/tmp/state.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "busy"),
        });
        let hint = recovery_hint(&rename).unwrap();
        assert!(!hint.starts_with("Your saved data"));

        let no_hint = anyhow::Error::new(StorageError::NotFound {
            path: PathBuf::from("/tmp/state.json"),
        });
        assert!(recovery_hint(&no_hint).is_none());

        let plain = anyhow::anyhow!("something else");
        assert!(recovery_hint(&plain).is_none());
    }
}
