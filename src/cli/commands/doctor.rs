//! Doctor command - verify API keys and configuration.

use crate::cli::{mask_secret, Output};
use crate::config::{ProviderSettings, Settings};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kapittel Doctor");
    println!();
    println!("Checking API keys and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("LLM Providers").bold());
    let key_checks = check_api_keys(settings);
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(),
        check_settings(settings),
        check_prompts(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Kapittel.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Kapittel is ready to use.");
    }

    Ok(())
}

fn check_provider_key(slot: &str, provider: &ProviderSettings) -> CheckResult {
    let name = format!("{} ({}, {})", slot, provider.kind, provider.api_key_env);
    match provider.api_key() {
        Some(key) => CheckResult::ok(&name, &format!("configured ({})", mask_secret(&key))),
        None => CheckResult::warning(
            &name,
            "not set",
            &format!("Set with: export {}='...'", provider.api_key_env),
        ),
    }
}

/// One check per provider; an error if neither has a key.
fn check_api_keys(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        check_provider_key("primary", &settings.llm.primary),
        check_provider_key("fallback", &settings.llm.fallback),
    ];

    if results.iter().all(|r| r.status != CheckStatus::Ok) {
        results.push(CheckResult::error(
            "LLM access",
            "no provider has an API key",
            "Titles and summaries need at least one configured provider",
        ));
    }

    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: kapittel config edit",
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "{} target sections, quota cooldown {}h",
                settings.segmentation.target_sections, settings.llm.quota_reset_hours
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the value in config.toml"),
    }
}

fn check_prompts(settings: &Settings) -> CheckResult {
    let Some(dir) = settings.prompts.custom_dir.as_deref() else {
        return CheckResult::ok("Prompts", "built-in");
    };

    let path = Settings::expand_path(dir);
    if !path.is_dir() {
        return CheckResult::warning(
            "Prompts",
            &format!("{} does not exist", path.display()),
            "Built-in prompts will be used",
        );
    }

    match crate::config::Prompts::load(Some(dir), None) {
        Ok(_) => CheckResult::ok("Prompts", &format!("custom ({})", path.display())),
        Err(e) => CheckResult::error(
            "Prompts",
            &e.to_string(),
            "Check titles.toml and summary.toml syntax",
        ),
    }
}
