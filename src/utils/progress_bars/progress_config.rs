// src/utils/progress_bars/progress_config.rs

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::env;

/// Configuration for progress tracking throughout the pipeline
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Whether to show per-row bars for key extraction and matching
    pub detailed: bool,
    /// Whether to report memory usage in the run summary
    pub show_memory: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detailed: true,
            show_memory: true,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("PROGRESS_ENABLED", true),
            detailed: env_flag("PROGRESS_DETAILED", true),
            show_memory: env_flag("PROGRESS_SHOW_MEMORY", true),
        }
    }

    /// Progress fully disabled, used by tests and non-interactive callers.
    pub fn silent() -> Self {
        Self {
            enabled: false,
            detailed: false,
            show_memory: false,
        }
    }

    /// Create a MultiProgress instance if progress is enabled, None otherwise
    pub fn create_multi_progress(&self) -> Option<MultiProgress> {
        if self.enabled {
            Some(MultiProgress::new())
        } else {
            None
        }
    }

    pub fn should_show_detailed(&self) -> bool {
        self.enabled && self.detailed
    }

    pub fn should_show_memory(&self) -> bool {
        self.enabled && self.show_memory
    }

    /// Bar for a per-row stage; hidden when detailed progress is off.
    pub fn row_progress_bar(&self, multi: Option<&MultiProgress>, len: usize, label: &str) -> ProgressBar {
        if !self.should_show_detailed() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  🌐 [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_message(label.to_string());
        match multi {
            Some(mp) => mp.add(bar),
            None => bar,
        }
    }

    /// Top-level bar over the configured operations.
    pub fn pipeline_progress_bar(&self, multi: Option<&MultiProgress>, len: usize) -> Option<ProgressBar> {
        let mp = multi?;
        let bar = mp.add(ProgressBar::new(len as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_message("Initializing pipeline...");
        Some(bar)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Print help information about environment variables
pub fn print_progress_env_help() {
    println!("Progress Configuration Environment Variables:");
    println!("  PROGRESS_ENABLED=true|false       - Enable/disable all progress bars (default: true)");
    println!("  PROGRESS_DETAILED=true|false      - Show per-row extraction/matching bars (default: true)");
    println!("  PROGRESS_SHOW_MEMORY=true|false   - Report memory usage in the summary (default: true)");
    println!();
    println!("# For minimal output (CI/automated environments):");
    println!("export PROGRESS_ENABLED=false");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProgressConfig::default();
        assert!(config.enabled);
        assert!(config.detailed);
        assert!(config.show_memory);
    }

    #[test]
    fn test_env_config() {
        env::set_var("PROGRESS_ENABLED", "false");
        env::set_var("PROGRESS_DETAILED", "false");
        env::set_var("PROGRESS_SHOW_MEMORY", "not-a-bool");

        let config = ProgressConfig::from_env();
        assert!(!config.enabled);
        assert!(!config.detailed);
        // Unparseable values fall back to the default
        assert!(config.show_memory);

        env::remove_var("PROGRESS_ENABLED");
        env::remove_var("PROGRESS_DETAILED");
        env::remove_var("PROGRESS_SHOW_MEMORY");
    }

    #[test]
    fn test_multi_progress_creation() {
        let mut config = ProgressConfig::default();

        config.enabled = true;
        assert!(config.create_multi_progress().is_some());

        config.enabled = false;
        assert!(config.create_multi_progress().is_none());
    }

    #[test]
    fn test_should_show_methods() {
        let mut config = ProgressConfig::default();
        assert!(config.should_show_detailed());
        assert!(config.should_show_memory());

        config.enabled = false;
        assert!(!config.should_show_detailed());
        assert!(!config.should_show_memory());

        config.enabled = true;
        config.detailed = false;
        assert!(!config.should_show_detailed());
        assert!(config.row_progress_bar(None, 10, "rows").is_hidden());
    }
}
