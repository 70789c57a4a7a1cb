use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
    value::Uncased,
};
use serde::Serialize;

use crate::cli::Cli;
use crate::config::UnpackConfig;
use crate::error::{ConfigError, Result};

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fob-unpack.config.json";

const ENV_PREFIX: &str = "FOB_UNPACK_";

/// Flags that were actually given; absent ones leave lower layers alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<std::path::PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_path: Option<std::path::PathBuf>,
}

impl CliOverrides {
    fn from_cli(args: &Cli) -> Self {
        Self {
            out_dir: args.out_dir.clone(),
            clean: args.clean.then_some(true),
            format: args.no_format.then_some(false),
            parallel: args.sequential.then_some(false),
            max_nodes: args.max_nodes,
            root_path: args.root_name.as_ref().map(Into::into),
        }
    }
}

impl UnpackConfig {
    /// Load configuration from every source.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &Cli) -> Result<Self> {
        Self::load_with_default(args, Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Like [`load`](Self::load) with a different fallback config file.
    pub fn load_with_default(args: &Cli, default_file: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match &args.config {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            Some(path) => figment = figment.merge(Json::file(path)),
            None if default_file.exists() => figment = figment.merge(Json::file(default_file)),
            None => {}
        }

        // FOB_UNPACK_MAX_NODES -> maxNodes, FOB_UNPACK_CLEAN -> clean
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| Uncased::from(env_key_to_field(key.as_str()))),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from_cli(args)));

        let config: Self = figment.extract().map_err(|e| {
            let field = if e.path.is_empty() {
                "configuration".to_string()
            } else {
                e.path.join(".")
            };
            ConfigError::InvalidValue {
                field,
                value: e.to_string(),
                hint: format!(
                    "Check {DEFAULT_CONFIG_FILE} syntax and {ENV_PREFIX}* environment variables"
                ),
            }
        })?;

        config.validate()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}

/// `MAX_NODES` -> `maxNodes`.
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !field.is_empty();
        } else if upper_next {
            field.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            field.push(ch.to_ascii_lowercase());
        }
    }
    field
}
