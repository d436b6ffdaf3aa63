//! Prompt templates for Kapittel.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub titles: TitlePrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for section titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePrompts {
    pub section: String,
}

impl Default for TitlePrompts {
    fn default() -> Self {
        Self {
            section: r#"You are an educational content assistant.

Based on the following video section content, generate a clear, concise, and academic section title in **less than 8 words**.

Content:
"""{{content}}"""

Rules:
- Be specific to the topic
- Avoid generic words like 'Section' or 'Part'
- No quotes or punctuation at the end

Only respond with the section title."#
                .to_string(),
        }
    }
}

/// Prompts for whole-video and per-section summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub video: String,
    pub section: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            video: r#"Create a comprehensive summary of this educational video: "{{title}}"

Video Information:
- Channel: {{channel}}
- Duration: {{duration}}

Main Sections:
{{sections}}

Full Transcript:
{{transcript}}...

Requirements:
1. Create an executive summary (2-3 sentences) of the entire video
2. Structure the summary using the provided timestamps as section headers
3. Include key concepts, important facts, and main takeaways
4. Maintain logical flow between sections
5. Use academic tone suitable for students
6. Preserve technical terminology and definitions
7. Focus on educational value and learning outcomes

Format the response with:
- Executive Summary at the top
- Detailed sections following the timestamp structure
- Key takeaways at the end"#
                .to_string(),

            section: r#"Create a detailed, educational summary of this video section titled "{{section_title}}":

{{section_text}}

Requirements:
- Maintain academic tone
- Include key concepts and definitions
- Preserve technical terminology
- Focus on educational value
- Structure with bullet points for clarity

Summary:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let titles_path = custom_path.join("titles.toml");
            if titles_path.exists() {
                let content = std::fs::read_to_string(&titles_path)?;
                prompts.titles = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
