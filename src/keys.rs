//! Create-or-replace for account SSH keys, so a pipeline can rotate key
//! material under a stable name.

use crate::error::DeployError;
use crate::hcloud::HcloudApi;

/// Store `public_key` under `name`, replacing any existing key of that
/// name, and return the name on success.
///
/// Replacement is delete-then-recreate: the API's update endpoint can only
/// rename a key, not change its material. The key is briefly absent between
/// the two calls, which is acceptable for sequential pipeline use.
pub fn ensure_key(
    api: &dyn HcloudApi,
    name: &str,
    public_key: &str,
) -> Result<String, DeployError> {
    if let Some(existing) = api.resolve_ssh_key(name)? {
        info!(
            "SSH key with name '{}' already exists, deleting it...",
            name
        );
        api.delete_ssh_key(existing.id)?;
        info!("Existing SSH key deleted");
    }
    info!("Creating new SSH key '{}'...", name);
    let key = api.create_ssh_key(name, public_key)?;
    info!("SSH key created successfully: {}", key.name);
    Ok(key.name)
}
