//! Configuration for the pipeline entry points. All settings are read from
//! environment variables exactly once at startup, into plain structs with
//! documented defaults; nothing deeper in the crate touches the environment.

use crate::error::DeployError;
use std::env;

/// Server name used when `HCLOUD_SERVER_NAME` is unset.
pub const DEFAULT_SERVER_NAME: &str = "my-app-server";
/// Machine type used when `HCLOUD_SERVER_TYPE` is unset.
pub const DEFAULT_SERVER_TYPE: &str = "cx22";
/// OS image used when `HCLOUD_IMAGE` is unset.
pub const DEFAULT_IMAGE: &str = "ubuntu-24.04";
/// Wait budget, in seconds, used when `HCLOUD_SERVER_WAIT_TIMEOUT` is
/// unset or unparseable.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 120;

fn env_lookup(var: &str) -> Option<String> {
    env::var(var).ok()
}

// Empty strings come up a lot in CI, where `FOO: ${{ vars.FOO }}` expands
// to nothing. Treat them the same as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn require(value: Option<String>, var: &str) -> Result<String, DeployError> {
    non_empty(value).ok_or_else(|| DeployError::Config {
        msg: format!("{} environment variable is not set", var),
    })
}

/// Settings for the `create-server` entry point.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Hetzner Cloud API bearer token. Mandatory.
    pub token: String,
    /// Name for the new server.
    pub name: String,
    /// Hetzner server type, e.g. `cx22`.
    pub server_type: String,
    /// OS image name or id.
    pub image: String,
    /// Name of an SSH key to attach, if any.
    pub ssh_key_name: Option<String>,
    /// How long to wait for the server to reach `running`.
    pub wait_timeout_secs: u64,
}

impl ServerConfig {
    /// Read the server configuration from the process environment.
    pub fn from_env() -> Result<ServerConfig, DeployError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup<F>(get: F) -> Result<ServerConfig, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = require(get("HCLOUD_TOKEN"), "HCLOUD_TOKEN")?;
        let wait_timeout_secs = match non_empty(get("HCLOUD_SERVER_WAIT_TIMEOUT")) {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "Invalid HCLOUD_SERVER_WAIT_TIMEOUT value '{}', using default of {} seconds",
                    raw, DEFAULT_WAIT_TIMEOUT_SECS
                );
                DEFAULT_WAIT_TIMEOUT_SECS
            }),
            None => DEFAULT_WAIT_TIMEOUT_SECS,
        };
        Ok(ServerConfig {
            token,
            name: non_empty(get("HCLOUD_SERVER_NAME"))
                .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            server_type: non_empty(get("HCLOUD_SERVER_TYPE"))
                .unwrap_or_else(|| DEFAULT_SERVER_TYPE.to_string()),
            image: non_empty(get("HCLOUD_IMAGE")).unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            ssh_key_name: non_empty(get("HCLOUD_SSH_KEY_NAME")),
            wait_timeout_secs,
        })
    }
}

/// Settings for the `create-ssh-key` entry point. All fields mandatory.
#[derive(Debug, Clone)]
pub struct KeyConfig {
    /// Hetzner Cloud API bearer token.
    pub token: String,
    /// Name under which the public key is stored.
    pub key_name: String,
    /// Public key material, e.g. an `ssh-ed25519 ...` line.
    pub public_key: String,
}

impl KeyConfig {
    /// Read the SSH key configuration from the process environment.
    pub fn from_env() -> Result<KeyConfig, DeployError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup<F>(get: F) -> Result<KeyConfig, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(KeyConfig {
            token: require(get("HCLOUD_TOKEN"), "HCLOUD_TOKEN")?,
            key_name: require(get("SSH_KEY_NAME"), "SSH_KEY_NAME")?,
            public_key: require(get("SSH_PUBLIC_KEY"), "SSH_PUBLIC_KEY")?,
        })
    }
}

/// Settings for the `delete-server` entry point.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Hetzner Cloud API bearer token.
    pub token: String,
    /// Server to delete. `None` means delete every server in the account.
    pub name: Option<String>,
}

impl DeleteConfig {
    /// Read the deletion configuration from the process environment.
    pub fn from_env() -> Result<DeleteConfig, DeployError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup<F>(get: F) -> Result<DeleteConfig, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(DeleteConfig {
            token: require(get("HCLOUD_TOKEN"), "HCLOUD_TOKEN")?,
            name: non_empty(get("HCLOUD_SERVER_NAME")),
        })
    }
}
