//! Configuration schema and loading.
//!
//! A `remora.{toml,yaml,json}` file in the working directory or under
//! `~/.config/remora/` configures the webhook; every section has
//! defaults, so no file at all is also a valid setup. `${ENV_VAR}`
//! placeholders in string values are expanded at load time, which keeps
//! API keys out of the file itself.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config},
    schema::{
        AssistantConfig, ProviderConfig, RemoraConfig, ReplyConfig, ServerConfig, StorageConfig,
    },
};
