//! Teardown of one or all servers, with a best-effort graceful shutdown
//! before each delete.

use crate::error::DeployError;
use crate::hcloud::{HcloudApi, Server};

/// Delete the named server, or every server in the account when `name` is
/// `None`.
///
/// Returns `false` when the account is empty or the named server does not
/// exist; `true` otherwise. Each target gets a shutdown request first, but
/// a shutdown failure never blocks the delete. Per-server outcomes are
/// collected and summarized at the end rather than aborting the batch.
pub fn delete_servers(api: &dyn HcloudApi, name: Option<&str>) -> Result<bool, DeployError> {
    let servers = api.list_servers()?;
    if servers.is_empty() {
        info!("No servers found in your Hetzner account.");
        return Ok(false);
    }
    let targets: Vec<Server> = match name {
        Some(wanted) => {
            info!("Looking for server '{}'...", wanted);
            servers.into_iter().filter(|s| s.name == wanted).collect()
        }
        None => {
            info!(
                "No specific server name provided. Deleting ALL {} servers...",
                servers.len()
            );
            servers
        }
    };
    if targets.is_empty() {
        // Only reachable with a name filter.
        warn!("Server '{}' not found.", name.unwrap_or_default());
        return Ok(false);
    }

    let mut failed: Vec<String> = vec![];
    for server in targets {
        info!(
            "Stopping and deleting server '{}' (ID: {}, IP: {})...",
            server.name,
            server.id,
            server.ipv4_address().unwrap_or("unassigned")
        );
        match api.shutdown_server(server.id) {
            Ok(()) => info!("Server '{}' shutdown initiated.", server.name),
            Err(e) => warn!(
                "Graceful shutdown of server '{}' failed, deleting anyway: {}",
                server.name, e
            ),
        }
        match api.delete_server(server.id) {
            Ok(()) => info!("Server '{}' deleted successfully.", server.name),
            Err(e) => {
                error!("Error deleting server '{}': {}", server.name, e);
                failed.push(server.name);
            }
        }
    }
    if !failed.is_empty() {
        warn!("Failed to delete servers: {}", failed.join(", "));
    }
    Ok(true)
}
