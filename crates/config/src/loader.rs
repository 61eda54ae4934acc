use std::{
    fmt,
    path::{Path, PathBuf},
};

use {
    anyhow::{Context, bail},
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::BotmuxConfig};

/// File stem shared by every supported format.
const FILE_STEM: &str = "botmux";

/// Extensions probed in each search directory, in preference order.
const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Where a [`LoadedConfig`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Built-in defaults. `rejected` names a discovered file that failed to
    /// load.
    Defaults { rejected: Option<PathBuf> },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults { rejected: None } => f.write_str("built-in defaults"),
            Self::Defaults {
                rejected: Some(path),
            } => write!(f, "built-in defaults ({} failed to load)", path.display()),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: BotmuxConfig,
    pub source: ConfigSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Files without an extension are read as TOML.
    fn of(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => bail!("unsupported config format: .{other}"),
        }
    }

    fn parse(self, raw: &str) -> anyhow::Result<BotmuxConfig> {
        let config = match self {
            Self::Toml => toml::from_str(raw)?,
            Self::Yaml => serde_yaml::from_str(raw)?,
            Self::Json => serde_json::from_str(raw)?,
        };
        Ok(config)
    }
}

/// Read one config file, expanding `${VAR}` placeholders before parsing.
pub fn load_config(path: &Path) -> anyhow::Result<BotmuxConfig> {
    let format = Format::of(path)?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    format
        .parse(&substitute_env(&raw))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Load the config the CLI should run with.
///
/// An explicit path must load. Without one, the first file found by
/// [`find_config_file`] is used; if none exists, or it fails to load, the
/// defaults apply and the returned source says so.
pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: load_config(path)?,
            source: ConfigSource::File(path.to_path_buf()),
        });
    }

    Ok(load_discovered(find_config_file()))
}

fn load_discovered(found: Option<PathBuf>) -> LoadedConfig {
    let Some(path) = found else {
        debug!("no botmux config file found");
        return LoadedConfig {
            config: BotmuxConfig::default(),
            source: ConfigSource::Defaults { rejected: None },
        };
    };
    match load_config(&path) {
        Ok(config) => LoadedConfig {
            config,
            source: ConfigSource::File(path),
        },
        Err(e) => {
            warn!(path = %path.display(), error = ?e, "ignoring unreadable config");
            LoadedConfig {
                config: BotmuxConfig::default(),
                source: ConfigSource::Defaults {
                    rejected: Some(path),
                },
            }
        },
    }
}

/// First `botmux.<ext>` in the working directory, then in [`config_dir`].
pub fn find_config_file() -> Option<PathBuf> {
    std::iter::once(PathBuf::from("."))
        .chain(config_dir())
        .find_map(|dir| find_in(&dir))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(FILE_STEM).with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Per-user config directory, e.g. `~/.config/botmux/` on Linux.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", FILE_STEM).map(|d| d.config_dir().to_path_buf())
}
