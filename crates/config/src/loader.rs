use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::expand_vars, schema::RemoraConfig};

/// File names tried during discovery, in order.
const CONFIG_NAMES: &[&str] = &["remora.toml", "remora.yaml", "remora.yml", "remora.json"];

/// Load one config file. The format follows the extension; `${VAR}`
/// placeholders are expanded before parsing.
pub fn load_config(path: &Path) -> anyhow::Result<RemoraConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse(&expand_vars(&raw), path)
}

/// Locate and load the active config.
///
/// The working directory wins over the user directory
/// (`~/.config/remora/`) so a project can pin its own settings. A
/// missing file is not an error; a file that fails to parse is logged
/// and ignored rather than refusing to start.
pub fn discover_and_load() -> RemoraConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return RemoraConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            RemoraConfig::default()
        },
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_NAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// User-global config directory (`~/.config/remora/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "remora").map(|d| d.config_dir().to_path_buf())
}

/// Platform data directory, home of the default database path. Falls
/// back to the working directory when the platform reports none.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "remora")
        .map_or_else(|| PathBuf::from("."), |d| d.data_dir().to_path_buf())
}

fn parse(raw: &str, path: &Path) -> anyhow::Result<RemoraConfig> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => anyhow::bail!("unsupported config format: .{other}"),
    }
}
