//! Parsing and validation for cstyle.toml configuration files

use crate::config::rule_config::RuleConfig;
use crate::error::ConfigError;
use crate::rules::builtin;
use crate::types::{GlobPattern, RuleId, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main configuration struct for cstyle.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// cstyle metadata
    pub cstyle: CstyleMeta,

    /// Per-rule enablement and severity
    #[serde(default)]
    pub rules: BTreeMap<RuleId, RuleValue>,

    /// Rule thresholds and word lists
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cstyle: CstyleMeta {
                version: "1".to_string(),
                include: default_include(),
                exclude: Vec::new(),
            },
            rules: BTreeMap::new(),
            settings: SettingsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cstyle.version != "1" {
            return Err(ConfigError::Validation(format!(
                "Unsupported configuration version '{}'. Expected '1'",
                self.cstyle.version
            )));
        }

        for (kind, patterns) in [
            ("include", &self.cstyle.include),
            ("exclude", &self.cstyle.exclude),
        ] {
            for pattern in patterns {
                globset::Glob::new(pattern.as_str()).map_err(|e| {
                    ConfigError::Validation(format!(
                        "Invalid {} glob pattern '{}': {}",
                        kind,
                        pattern.as_str(),
                        e
                    ))
                })?;
            }
        }

        if let Some(length) = self.settings.max_identifier_length
            && length < 1
        {
            return Err(ConfigError::InvalidValue {
                field: "max-identifier-length".to_string(),
                message: format!("must be a positive integer, got {}", length),
            });
        }

        self.rule_config().validate()
    }

    /// Convert to the configuration the analysis core consumes
    ///
    /// Rules not mentioned under `[rules]` stay enabled with their default
    /// severity.
    pub fn rule_config(&self) -> RuleConfig {
        let mut config = RuleConfig::default();

        for (rule_id, value) in &self.rules {
            match value {
                RuleValue::Enabled(false) => {
                    config.enabled.remove(rule_id);
                }
                RuleValue::Enabled(true) => {
                    config.enabled.insert(rule_id.clone());
                }
                RuleValue::Settings(settings) => {
                    config.enabled.insert(rule_id.clone());
                    if let Some(severity) = settings.severity {
                        config.severity_overrides.insert(rule_id.clone(), severity);
                    }
                }
            }
        }

        if let Some(length) = self.settings.max_identifier_length {
            config.max_identifier_length = usize::try_from(length).unwrap_or(0);
        }
        if let Some(markers) = &self.settings.comment_markers {
            config.comment_markers = markers.clone();
        }
        if let Some(names) = &self.settings.reserved_type_names {
            config.reserved_type_names = names.iter().cloned().collect();
        }

        config
    }

    /// Whether `rule_id` names a built-in rule
    pub fn is_known_rule(rule_id: &RuleId) -> bool {
        builtin::default_severity(rule_id).is_some()
    }
}

/// cstyle metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstyleMeta {
    /// Configuration version (must be "1")
    pub version: String,

    /// File patterns to include
    #[serde(default = "default_include")]
    pub include: Vec<GlobPattern>,

    /// File patterns to exclude
    #[serde(default)]
    pub exclude: Vec<GlobPattern>,
}

fn default_include() -> Vec<GlobPattern> {
    vec![GlobPattern::new("**/*.c"), GlobPattern::new("**/*.h")]
}

/// A rule can be enabled with a boolean or configured with settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Simple boolean enable/disable
    Enabled(bool),
    /// Settings table for the rule
    Settings(RuleSettings),
}

/// Settings for individual rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    /// Severity level for this rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Rule thresholds section
///
/// Missing keys keep the built-in defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsConfig {
    /// Signed so a negative value is reported rather than rejected by the parser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_identifier_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_markers: Option<Vec<String>>,

    /// Replaces the default set when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_type_names: Option<Vec<String>>,
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Color output setting
    #[serde(default)]
    pub color: ColorOption,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
[cstyle]
version = "1"
include = ["src/**/*.c", "include/**/*.h"]
exclude = ["**/vendor/**"]

[rules]
goto-usage = false
comment-marker = { severity = "warning" }
macro-naming = true

[settings]
max-identifier-length = 31
comment-markers = ["TODO", "REVIEW"]

[output]
format = "jsonl"
color = "never"
"#;

    fn id(s: &str) -> RuleId {
        RuleId::new(s).unwrap()
    }

    #[test]
    fn test_valid_config_parsing() {
        let config = Config::parse(VALID_CONFIG).unwrap();

        assert_eq!(config.cstyle.version, "1");
        assert_eq!(config.cstyle.include.len(), 2);
        assert_eq!(config.cstyle.exclude.len(), 1);
        assert_eq!(config.rules.get(&id("goto-usage")), Some(&RuleValue::Enabled(false)));
        match config.rules.get(&id("comment-marker")) {
            Some(RuleValue::Settings(settings)) => {
                assert_eq!(settings.severity, Some(Severity::Warning));
            }
            other => panic!("Expected settings for comment-marker, got {:?}", other),
        }
        assert_eq!(config.settings.max_identifier_length, Some(31));
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert_eq!(config.output.color, ColorOption::Never);
    }

    #[test]
    fn test_rule_config_conversion() {
        let rule_config = Config::parse(VALID_CONFIG).unwrap().rule_config();

        assert!(!rule_config.is_enabled(&id("goto-usage")));
        assert!(rule_config.is_enabled(&id("comment-marker")));
        assert!(rule_config.is_enabled(&id("uninitialized-variable")));
        assert_eq!(rule_config.enabled.len(), 6);
        assert_eq!(
            rule_config.severity_for(&id("comment-marker"), Severity::Info),
            Severity::Warning
        );
        assert_eq!(rule_config.max_identifier_length, 31);
        assert_eq!(rule_config.comment_markers, vec!["TODO", "REVIEW"]);
        assert!(rule_config.reserved_type_names.contains("size_t"));
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("[cstyle]\nversion = \"1\"\n").unwrap();
        assert_eq!(
            config.cstyle.include,
            vec![GlobPattern::new("**/*.c"), GlobPattern::new("**/*.h")]
        );
        assert!(config.cstyle.exclude.is_empty());
        assert_eq!(config.output.format, OutputFormat::Human);
        assert_eq!(config.output.color, ColorOption::Auto);
        assert_eq!(config.rule_config(), RuleConfig::default());
    }

    #[test]
    fn test_default_matches_minimal() {
        let minimal = Config::parse("[cstyle]\nversion = \"1\"\n").unwrap();
        assert_eq!(minimal, Config::default());
    }

    #[test]
    fn test_invalid_version() {
        let result = Config::parse("[cstyle]\nversion = \"2\"\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_version() {
        let result = Config::parse("[cstyle]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_cstyle_section() {
        let result = Config::parse("[rules]\ngoto-usage = false\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = Config::parse("[cstyle]\nversion = \"1\"\nexclude = [\"[\"]\n");
        match result {
            Err(ConfigError::Validation(message)) => assert!(message.contains("exclude")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_rule() {
        let result = Config::parse("[cstyle]\nversion = \"1\"\n\n[rules]\nno-such-rule = true\n");
        match result {
            Err(ConfigError::UnknownRule(rule)) => assert_eq!(rule, "no-such-rule"),
            other => panic!("Expected unknown rule error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_threshold() {
        let result = Config::parse(
            "[cstyle]\nversion = \"1\"\n\n[settings]\nmax-identifier-length = -5\n",
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_threshold() {
        let result =
            Config::parse("[cstyle]\nversion = \"1\"\n\n[settings]\nmax-identifier-length = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_marker() {
        let result =
            Config::parse("[cstyle]\nversion = \"1\"\n\n[settings]\ncomment-markers = [\"TO DO\"]\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_severity() {
        let result = Config::parse(
            "[cstyle]\nversion = \"1\"\n\n[rules]\ngoto-usage = { severity = \"fatal\" }\n",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_settings_key() {
        let result = Config::parse("[cstyle]\nversion = \"1\"\n\n[settings]\nmax-length = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reserved_type_names_replace_defaults() {
        let config = Config::parse(
            "[cstyle]\nversion = \"1\"\n\n[settings]\nreserved-type-names = [\"handle_t\"]\n",
        )
        .unwrap();
        let names = config.rule_config().reserved_type_names;
        assert_eq!(names.len(), 1);
        assert!(names.contains("handle_t"));
    }

    #[test]
    fn test_is_known_rule() {
        assert!(Config::is_known_rule(&id("indentation-consistency")));
        assert!(!Config::is_known_rule(&id("no-unwrap")));
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let reparsed = Config::parse(&serialized).unwrap();
        assert_eq!(config, reparsed);
    }
}
