//! Story generator configuration (`bedtime.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::ledger::MAX_ATTEMPTS_CEILING;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bedtime.toml";

/// Generator configuration (TOML).
///
/// Missing fields default to the values the prompts were tuned with.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoryConfig {
    /// Generation attempts before giving up (1-3).
    pub max_attempts: u32,

    pub model: ModelConfig,

    pub calls: CallsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    pub name: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub api_base: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

/// Token and temperature settings for one kind of model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Per-call settings. Each `[calls.*]` table may set either key; the other
/// keeps that call's default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(from = "CallsTables")]
pub struct CallsConfig {
    /// Bedtime-goal classification.
    pub normalize: CallSettings,
    /// Story drafts and revisions.
    pub story: CallSettings,
    /// Rubric evaluation.
    pub judge: CallSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-3.5-turbo".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            normalize: CallSettings {
                max_tokens: 50,
                temperature: 0.3,
            },
            story: CallSettings {
                max_tokens: 1500,
                temperature: 0.8,
            },
            judge: CallSettings {
                max_tokens: 800,
                temperature: 0.1,
            },
        }
    }
}

/// `[calls]` as written in the file, before defaults are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CallsTables {
    normalize: CallOverrides,
    story: CallOverrides,
    judge: CallOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CallOverrides {
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl CallOverrides {
    fn apply(self, base: CallSettings) -> CallSettings {
        CallSettings {
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }
}

impl From<CallsTables> for CallsConfig {
    fn from(tables: CallsTables) -> Self {
        let defaults = CallsConfig::default();
        Self {
            normalize: tables.normalize.apply(defaults.normalize),
            story: tables.story.apply(defaults.story),
            judge: tables.judge.apply(defaults.judge),
        }
    }
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS_CEILING,
            model: ModelConfig::default(),
            calls: CallsConfig::default(),
        }
    }
}

impl StoryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ATTEMPTS_CEILING).contains(&self.max_attempts) {
            return Err(anyhow!(
                "max_attempts must be between 1 and {MAX_ATTEMPTS_CEILING}"
            ));
        }
        if self.model.name.trim().is_empty() {
            return Err(anyhow!("model.name must be non-empty"));
        }
        if self.model.api_base.trim().is_empty() {
            return Err(anyhow!("model.api_base must be non-empty"));
        }
        if self.model.timeout_secs == 0 {
            return Err(anyhow!("model.timeout_secs must be > 0"));
        }
        for (name, call) in [
            ("normalize", &self.calls.normalize),
            ("story", &self.calls.story),
            ("judge", &self.calls.judge),
        ] {
            if call.max_tokens == 0 {
                return Err(anyhow!("calls.{name}.max_tokens must be > 0"));
            }
            if !(0.0..=2.0).contains(&call.temperature) {
                return Err(anyhow!("calls.{name}.temperature must be within 0.0-2.0"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StoryConfig::default()`.
pub fn load_config(path: &Path) -> Result<StoryConfig> {
    if !path.exists() {
        let cfg = StoryConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StoryConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, StoryConfig::default());
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.calls.judge.max_tokens, 800);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bedtime.toml");
        fs::write(
            &path,
            "[model]\nname = \"local-model\"\napi_base = \"http://localhost:1234/v1\"\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.model.name, "local-model");
        assert_eq!(cfg.model.timeout_secs, 120);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.calls, CallsConfig::default());
    }

    #[test]
    fn partial_call_table_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bedtime.toml");
        fs::write(
            &path,
            "[calls.judge]\nmax_tokens = 500\n\n[calls.story]\ntemperature = 0.5\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        let defaults = CallsConfig::default();

        assert_eq!(cfg.calls.judge.max_tokens, 500);
        assert_eq!(cfg.calls.judge.temperature, defaults.judge.temperature);
        assert_eq!(cfg.calls.story.max_tokens, defaults.story.max_tokens);
        assert_eq!(cfg.calls.story.temperature, 0.5);
        assert_eq!(cfg.calls.normalize, defaults.normalize);
    }

    #[test]
    fn unknown_call_key_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bedtime.toml");
        fs::write(&path, "[calls.judge]\nmax_token = 500\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_token"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases = [
            (
                StoryConfig {
                    max_attempts: 0,
                    ..StoryConfig::default()
                },
                "max_attempts",
            ),
            (
                StoryConfig {
                    max_attempts: 4,
                    ..StoryConfig::default()
                },
                "max_attempts",
            ),
            (
                StoryConfig {
                    model: ModelConfig {
                        timeout_secs: 0,
                        ..ModelConfig::default()
                    },
                    ..StoryConfig::default()
                },
                "timeout_secs",
            ),
        ];
        for (cfg, needle) in cases {
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains(needle), "{err}");
        }

        let mut cfg = StoryConfig::default();
        cfg.calls.judge.temperature = 3.5;
        assert!(
            cfg.validate()
                .unwrap_err()
                .to_string()
                .contains("calls.judge.temperature")
        );
    }

    #[test]
    fn load_reports_invalid_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bedtime.toml");
        fs::write(&path, "max_attempts = 9\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }
}
