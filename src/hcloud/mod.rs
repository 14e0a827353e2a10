//! Support for the Hetzner Cloud provider. Thin blocking wrappers around
//! the REST API at <https://docs.hetzner.cloud/>, one submodule per
//! resource collection.

use crate::error::DeployError;
use serde_json::Value;

pub mod firewall;
pub mod server;
pub mod ssh_key;

#[cfg(test)]
pub mod fake;

pub use self::firewall::{Firewall, FirewallRule};
pub use self::server::{CreatedServer, Server, ServerSpec};
pub use self::ssh_key::SshKey;

const HCLOUD_API_BASE_URL: &str = "https://api.hetzner.cloud/v1";

/// Authenticated handle to the Hetzner Cloud API.
pub struct HcloudClient {
    http: reqwest::blocking::Client,
    token: String,
    base_url: String,
}

impl HcloudClient {
    /// Build a client from a bearer token. The token is validated lazily,
    /// on the first request.
    pub fn new(token: &str) -> HcloudClient {
        HcloudClient {
            http: reqwest::blocking::Client::new(),
            token: token.to_string(),
            base_url: HCLOUD_API_BASE_URL.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.base_url.to_owned() + path
    }

    // The API reports errors as JSON bodies with a non-2xx status; keep the
    // body text in the error so quota/auth failures are diagnosable.
    fn read_response(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<Value, DeployError> {
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(DeployError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) fn get(&self, path: &str) -> Result<Value, DeployError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()?;
        self.read_response(response)
    }

    pub(crate) fn get_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, DeployError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .bearer_auth(&self.token)
            .send()?;
        self.read_response(response)
    }

    pub(crate) fn post(&self, path: &str, body: &Value) -> Result<Value, DeployError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .bearer_auth(&self.token)
            .send()?;
        self.read_response(response)
    }

    pub(crate) fn delete(&self, path: &str) -> Result<(), DeployError> {
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()?;
        self.read_response(response)?;
        Ok(())
    }
}

/// Provider operations used by the orchestration modules. Implemented by
/// [HcloudClient] over HTTP, and by an in-memory double in tests, so the
/// poll loop and the CRUD managers can be exercised without a network.
pub trait HcloudApi {
    /// Look up an SSH key by name. `Ok(None)` means no such key.
    fn resolve_ssh_key(&self, name: &str) -> Result<Option<SshKey>, DeployError>;
    /// Store a public key under the given name.
    fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey, DeployError>;
    /// Remove an SSH key by id.
    fn delete_ssh_key(&self, id: i64) -> Result<(), DeployError>;
    /// Submit a server creation request, optionally attaching an SSH key.
    fn create_server(
        &self,
        spec: &ServerSpec,
        ssh_key: Option<&SshKey>,
    ) -> Result<CreatedServer, DeployError>;
    /// Fetch a fresh snapshot of one server.
    fn get_server(&self, id: i64) -> Result<Server, DeployError>;
    /// List every server in the account.
    fn list_servers(&self) -> Result<Vec<Server>, DeployError>;
    /// Request a graceful (ACPI) shutdown of a server.
    fn shutdown_server(&self, id: i64) -> Result<(), DeployError>;
    /// Delete a server.
    fn delete_server(&self, id: i64) -> Result<(), DeployError>;
    /// Look up a firewall by name. `Ok(None)` means no such firewall.
    fn find_firewall(&self, name: &str) -> Result<Option<Firewall>, DeployError>;
    /// Create a firewall with the given rules, applied to one server.
    fn create_firewall(
        &self,
        name: &str,
        rules: &[FirewallRule],
        server_id: i64,
    ) -> Result<Firewall, DeployError>;
    /// Replace the rule set of an existing firewall.
    fn set_firewall_rules(&self, id: i64, rules: &[FirewallRule]) -> Result<(), DeployError>;
}

impl HcloudApi for HcloudClient {
    fn resolve_ssh_key(&self, name: &str) -> Result<Option<SshKey>, DeployError> {
        HcloudClient::resolve_ssh_key(self, name)
    }
    fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey, DeployError> {
        HcloudClient::create_ssh_key(self, name, public_key)
    }
    fn delete_ssh_key(&self, id: i64) -> Result<(), DeployError> {
        HcloudClient::delete_ssh_key(self, id)
    }
    fn create_server(
        &self,
        spec: &ServerSpec,
        ssh_key: Option<&SshKey>,
    ) -> Result<CreatedServer, DeployError> {
        HcloudClient::create_server(self, spec, ssh_key)
    }
    fn get_server(&self, id: i64) -> Result<Server, DeployError> {
        HcloudClient::get_server(self, id)
    }
    fn list_servers(&self) -> Result<Vec<Server>, DeployError> {
        HcloudClient::list_servers(self)
    }
    fn shutdown_server(&self, id: i64) -> Result<(), DeployError> {
        HcloudClient::shutdown_server(self, id)
    }
    fn delete_server(&self, id: i64) -> Result<(), DeployError> {
        HcloudClient::delete_server(self, id)
    }
    fn find_firewall(&self, name: &str) -> Result<Option<Firewall>, DeployError> {
        HcloudClient::find_firewall(self, name)
    }
    fn create_firewall(
        &self,
        name: &str,
        rules: &[FirewallRule],
        server_id: i64,
    ) -> Result<Firewall, DeployError> {
        HcloudClient::create_firewall(self, name, rules, server_id)
    }
    fn set_firewall_rules(&self, id: i64, rules: &[FirewallRule]) -> Result<(), DeployError> {
        HcloudClient::set_firewall_rules(self, id, rules)
    }
}
