//! Document rendering of a processed video.
//!
//! JSON mirrors the structured result; Markdown is a readable study document; the chapter
//! list is ready to paste into a video description.

use crate::error::Result;
use crate::orchestrator::VideoSummary;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Maximum number of key takeaways in a document.
pub const MAX_TAKEAWAYS: usize = 8;

/// Placeholder when the summary has no list items.
pub const NO_KEY_POINTS: &str = "No key points found";

// One bullet character or a `12.` number, and the whitespace after it.
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[•*-]|\d+\.)\s*").expect("Invalid regex"));

/// Output format for exported summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Chapters,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "chapters" | "txt" => Ok(ExportFormat::Chapters),
            _ => Err(format!(
                "Unknown format: {}. Use json, markdown, or chapters.",
                s
            )),
        }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Chapters => "txt",
        }
    }
}

/// Render a summary in the requested format.
pub fn render(summary: &VideoSummary, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(summary)?,
        ExportFormat::Markdown => render_markdown(summary),
        ExportFormat::Chapters => render_chapters(summary),
    })
}

/// Bullet and numbered lines of the full summary with their markers removed.
pub fn key_takeaways(full_summary: &str) -> Vec<String> {
    let takeaways: Vec<String> = full_summary
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let marker = LIST_MARKER_RE.find(line)?;
            Some(line[marker.end()..].trim().to_string())
        })
        .filter(|content| !content.is_empty())
        .take(MAX_TAKEAWAYS)
        .collect();

    if takeaways.is_empty() {
        vec![NO_KEY_POINTS.to_string()]
    } else {
        takeaways
    }
}

/// One `M:SS Title` line per section.
pub fn render_chapters(summary: &VideoSummary) -> String {
    summary
        .timestamps
        .iter()
        .map(|t| format!("{} {}", t.time, t.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Study document with recap, outline, full summary and takeaways.
pub fn render_markdown(summary: &VideoSummary) -> String {
    let mut doc = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(doc, "# {}\n", summary.title);
    let _ = writeln!(doc, "- **Channel:** {}", summary.channel);
    let _ = writeln!(doc, "- **Duration:** {}", summary.duration);
    let _ = writeln!(doc, "- **Uploaded:** {}", summary.upload_date);
    let _ = writeln!(doc, "- **Video:** <{}>\n", summary.url);

    let _ = writeln!(doc, "## Quick Recap\n\n{}\n", summary.executive_summary);

    let _ = writeln!(doc, "## What's Covered\n");
    for t in &summary.timestamps {
        let _ = writeln!(
            doc,
            "- [{}]({}&t={}s) {}",
            t.time,
            summary.url,
            t.start_seconds as u64,
            t.title
        );
    }

    let _ = writeln!(doc, "\n## Full Summary\n\n{}\n", summary.full_summary.trim());

    let _ = writeln!(doc, "## Key Takeaways\n");
    for takeaway in key_takeaways(&summary.full_summary) {
        let _ = writeln!(doc, "- {}", takeaway);
    }

    let _ = writeln!(doc, "\n## Summary Details\n");
    let _ = writeln!(
        doc,
        "- Generated on: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(doc, "- Processing time: {:.2}s", summary.processing_time);
    let _ = writeln!(
        doc,
        "- Caption extraction: {:.2}s",
        summary.subtitle_extraction_time
    );

    doc
}
