//! Applies an IP allowlist to every server in the account, one firewall
//! per server. Intended for sequential pipeline use; there is no locking
//! against concurrent invocations.

use crate::error::DeployError;
use crate::hcloud::firewall::allowlist_rules;
use crate::hcloud::HcloudApi;

/// Deterministic firewall name for a server.
pub fn firewall_name(server_name: &str) -> String {
    format!("firewall-{}", server_name)
}

/// For each existing server, create or update a firewall named
/// `firewall-<server name>` whose rules admit only `allowed_ips` (TCP and
/// UDP on all ports, plus ICMP). Per-server provider errors are logged and
/// the remaining servers are still processed.
pub fn apply_allowlist(api: &dyn HcloudApi, allowed_ips: &[String]) -> Result<(), DeployError> {
    let rules = allowlist_rules(allowed_ips);
    let servers = api.list_servers()?;
    let mut failures = 0;
    for server in &servers {
        let name = firewall_name(&server.name);
        let outcome = match api.find_firewall(&name) {
            Ok(Some(firewall)) => api.set_firewall_rules(firewall.id, &rules),
            Ok(None) => api.create_firewall(&name, &rules, server.id).map(|_| ()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => info!("Firewall configured for server: {}", server.name),
            Err(e) => {
                error!("Error configuring firewall for server '{}': {}", server.name, e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        warn!(
            "Failed to configure firewalls for {} of {} servers",
            failures,
            servers.len()
        );
    }
    Ok(())
}

/// Split a comma-separated allowlist argument into trimmed entries. The
/// provider validates CIDR syntax; entries are passed through verbatim.
pub fn parse_allowed_ips(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .collect()
}
