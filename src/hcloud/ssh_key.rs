//! SSH key resources. Keys are referenced by name in our configuration,
//! but the API wants numeric IDs at server-creation time, hence
//! [HcloudClient::resolve_ssh_key].

use serde::Deserialize;
use serde_json::json;

use super::HcloudClient;
use crate::error::DeployError;

/// An SSH public key stored with the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SshKey {
    /// Numeric ID assigned by the API.
    pub id: i64,
    /// Human-readable name, unique per account.
    pub name: String,
    /// Fingerprint of the public key, computed by the API.
    pub fingerprint: Option<String>,
}

#[derive(Deserialize)]
struct SshKeyResponse {
    ssh_key: SshKey,
}

#[derive(Deserialize)]
struct SshKeyListResponse {
    ssh_keys: Vec<SshKey>,
}

impl HcloudClient {
    /// Look up an SSH key by its name. Returns `Ok(None)` when the account
    /// holds no key of that name.
    pub fn resolve_ssh_key(&self, name: &str) -> Result<Option<SshKey>, DeployError> {
        let response = self.get_query("/ssh_keys", &[("name", name)])?;
        let listed: SshKeyListResponse = serde_json::from_value(response)?;
        Ok(listed.ssh_keys.into_iter().next())
    }

    /// Store a public key under the given name. The name must not already
    /// be taken; see [crate::keys::ensure_key] for replace semantics.
    pub fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey, DeployError> {
        let body = json!({
            "name": name,
            "public_key": public_key,
        });
        let response = self.post("/ssh_keys", &body)?;
        let created: SshKeyResponse = serde_json::from_value(response)?;
        Ok(created.ssh_key)
    }

    /// Delete an SSH key. Servers already created with it keep the key in
    /// their authorized_keys.
    pub fn delete_ssh_key(&self, id: i64) -> Result<(), DeployError> {
        self.delete(&format!("/ssh_keys/{}", id))
    }
}
