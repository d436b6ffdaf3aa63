//! CLI command implementations.

mod config;
mod doctor;
mod providers;
mod section;
mod summarize;
mod timestamps;
mod transcript;

pub use config::run_config;
pub use doctor::run_doctor;
pub use providers::run_providers;
pub use section::run_section;
pub use summarize::run_summarize;
pub use timestamps::run_timestamps;
pub use transcript::run_transcript;

use crate::config::Settings;
use std::path::PathBuf;

/// Write to `path`, or to stdout when it is `None` or `-`. Returns the written file path.
pub(crate) fn write_output(path: Option<&str>, content: &str) -> anyhow::Result<Option<PathBuf>> {
    match path {
        Some(p) if p != "-" => {
            let path = Settings::expand_path(p);
            if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
            Ok(Some(path))
        }
        _ => {
            println!("{}", content);
            Ok(None)
        }
    }
}
