//! tonesmith Core Library
//!
//! This crate provides the core functionality for tonesmith, a
//! marketing-copy rewriting assistant: it keeps projects, generation
//! history, liked outputs and the global tone of voice in a single JSON
//! document, and builds and sends rewrite prompts to a language model.
//!
//! # Architecture
//!
//! - **State document**: one `state.json`, rewritten whole and committed by
//!   atomic rename
//! - **Store**: every operation re-reads the committed file under a
//!   reentrant, per-instance lock
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open_with_config(Config::load()?)?;
//! store.create_project("Acme")?;
//!
//! let prompt = build_prompt(&store.get_tone_of_voice(), "Our app saves time.", "", &params, &settings);
//! let output = OpenAiGenerator::new(settings.clone()).generate(&prompt, &params);
//! store.append_history_item("Acme", "s1", HistoryItem::new("Our app saves time.", "", output, params))?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: State, projects, sessions and history items
//! - `storage`: JSON persistence and storage errors
//! - `config`: Application configuration
//! - `prompt`: Rewrite prompt construction
//! - `generation`: Language model client

pub mod config;
pub mod generation;
pub mod models;
pub mod prompt;
pub mod storage;
pub mod store;

pub use config::{Config, CorruptPolicy, GenerationSettings};
pub use generation::{is_diagnostic, Generator, OpenAiGenerator};
pub use models::{
    GenerationParams, HistoryItem, Length, ParseParamError, Project, Session, State, Strength,
};
pub use prompt::build_prompt;
pub use storage::{JsonPersistence, StorageError, StorageResult, StorageStats};
pub use store::Store;
