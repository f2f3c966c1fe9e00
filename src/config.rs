//! Configuration: the core's `RuleConfig` and the `cstyle.toml` file format

pub mod cstyle_toml;
pub mod rule_config;

pub use cstyle_toml::{
    ColorOption, Config, CstyleMeta, OutputConfig, OutputFormat, RuleSettings, RuleValue,
    SettingsConfig,
};
pub use rule_config::RuleConfig;
