//! Server resources: creation, polling, listing, shutdown and deletion.
//! See <https://docs.hetzner.cloud/#servers> for the wire format.

use serde::Deserialize;
use serde_json::json;

use super::{HcloudClient, SshKey};
use crate::error::DeployError;

/// The one status value the poll loop treats as terminal success.
pub const STATUS_RUNNING: &str = "running";

/// Immutable input to server provisioning.
#[derive(Debug, Clone)]
pub struct ServerSpec {
    /// Name for the new server, also its hostname.
    pub name: String,
    /// Hetzner server type, e.g. `cx22`.
    pub server_type: String,
    /// OS image name or id, e.g. `ubuntu-24.04`.
    pub image: String,
    /// Name of an SSH key to attach. Resolution failure downgrades to
    /// password authentication rather than failing the run.
    pub ssh_key_name: Option<String>,
}

/// Snapshot of a server, as reported by the API. Never mutated in place;
/// each poll fetches a fresh one.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// Numeric ID assigned by the API.
    pub id: i64,
    /// Human-readable name, also the hostname.
    pub name: String,
    /// Current status. `initializing` after creation, `running` once the
    /// host is booted and networking is populated.
    pub status: String,
    /// Public networking info. IPv4 may be absent until assignment.
    #[serde(default)]
    pub public_net: PublicNet,
}

/// The `public_net` object on a server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicNet {
    /// Primary public IPv4 assignment, if any.
    pub ipv4: Option<Ipv4>,
}

/// An IPv4 assignment inside `public_net`.
#[derive(Debug, Clone, Deserialize)]
pub struct Ipv4 {
    /// Dotted-quad address.
    pub ip: String,
}

impl Server {
    /// Public IPv4 address, if the provider has assigned one yet.
    pub fn ipv4_address(&self) -> Option<&str> {
        self.public_net.ipv4.as_ref().map(|v4| v4.ip.as_str())
    }
}

/// Result of a creation request. `root_password` is populated only when no
/// SSH key was attached.
#[derive(Debug, Clone)]
pub struct CreatedServer {
    /// The newly created server, status `initializing`.
    pub server: Server,
    /// Generated root password, absent with key-based auth.
    pub root_password: Option<String>,
}

#[derive(Deserialize)]
struct CreateServerResponse {
    server: Server,
    root_password: Option<String>,
}

#[derive(Deserialize)]
struct ServerResponse {
    server: Server,
}

#[derive(Deserialize)]
struct ServerListResponse {
    servers: Vec<Server>,
}

impl HcloudClient {
    /// Submit a creation request for one server. Does not wait for boot;
    /// see [crate::provision::provision] for that.
    pub fn create_server(
        &self,
        spec: &ServerSpec,
        ssh_key: Option<&SshKey>,
    ) -> Result<CreatedServer, DeployError> {
        let mut body = json!({
            "name": spec.name,
            "server_type": spec.server_type,
            "image": spec.image,
            "start_after_create": true,
        });
        if let Some(key) = ssh_key {
            body["ssh_keys"] = json!([key.id]);
        }
        let response = self.post("/servers", &body)?;
        let created: CreateServerResponse = serde_json::from_value(response)?;
        Ok(CreatedServer {
            server: created.server,
            root_password: created.root_password,
        })
    }

    /// Fetch the latest data for one server. Used by the poll loop to
    /// capture status changes and the public IPv4 assignment.
    pub fn get_server(&self, id: i64) -> Result<Server, DeployError> {
        let response = self.get(&format!("/servers/{}", id))?;
        let wrapped: ServerResponse = serde_json::from_value(response)?;
        Ok(wrapped.server)
    }

    /// List every server in the account, following pagination.
    pub fn list_servers(&self) -> Result<Vec<Server>, DeployError> {
        let mut servers = vec![];
        let mut page: i64 = 1;
        loop {
            let response = self.get_query(
                "/servers",
                &[("page", &page.to_string()), ("per_page", "50")],
            )?;
            let batch: ServerListResponse = serde_json::from_value(response.clone())?;
            servers.extend(batch.servers);
            match response["meta"]["pagination"]["next_page"].as_i64() {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(servers)
    }

    /// Ask the server to shut down gracefully via ACPI. The call returns
    /// once the action is accepted, not once the server is off.
    pub fn shutdown_server(&self, id: i64) -> Result<(), DeployError> {
        self.post(&format!("/servers/{}/actions/shutdown", id), &json!({}))?;
        Ok(())
    }

    /// Delete a server. Irreversible.
    pub fn delete_server(&self, id: i64) -> Result<(), DeployError> {
        self.delete(&format!("/servers/{}", id))
    }
}
