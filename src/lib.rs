//! Kapittel - YouTube transcript chapters and summaries
//!
//! A CLI tool that fetches a video's captions, splits them into topical sections and asks
//! an LLM to title and summarize each one.
//!
//! The name "Kapittel" is the Norwegian word for "chapter."
//!
//! # Overview
//!
//! Kapittel allows you to:
//! - Fetch the caption track of a YouTube video
//! - Detect topic boundaries with a lexical-similarity heuristic
//! - Title every section and summarize the whole video with an LLM
//! - Fall back to a secondary LLM provider when the primary is rate-limited or out of quota
//! - Export the outline as JSON, Markdown or a chapter list
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Caption fetching and video id parsing
//! - `segmentation` - Sentence splitting and topic boundary detection
//! - `llm` - LLM providers and the fallback gateway
//! - `summarizer` - Section titles and video summaries
//! - `orchestrator` - Pipeline coordination
//! - `export` - Document rendering of the final result
//!
//! # Example
//!
//! ```rust,no_run
//! use kapittel::config::Settings;
//! use kapittel::orchestrator::{Orchestrator, ProcessOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     match orchestrator.process_video("https://youtu.be/dQw4w9WgXcQ").await {
//!         ProcessOutcome::Success(summary) => println!("{} sections", summary.timestamps.len()),
//!         ProcessOutcome::Failure(failure) => eprintln!("{}", failure.error_message),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod orchestrator;
pub mod segmentation;
pub mod summarizer;
pub mod transcript;

pub use error::{KapittelError, Result};
