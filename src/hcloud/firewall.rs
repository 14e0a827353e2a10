//! Firewall resources. A firewall is a named set of inbound rules that can
//! be applied to servers; we create one per server, scoped to an IP
//! allowlist. See <https://docs.hetzner.cloud/#firewalls>.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::HcloudClient;
use crate::error::DeployError;

/// A single inbound firewall rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    /// Traffic direction, always `in` here.
    pub direction: String,
    /// `tcp`, `udp` or `icmp`.
    pub protocol: String,
    /// Port or port range, e.g. `1-65535`. Absent for ICMP, and the API
    /// rejects the field if present on an ICMP rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Source addresses permitted through; everything else is denied.
    pub source_ips: Vec<String>,
}

impl FirewallRule {
    fn inbound(protocol: &str, port: Option<&str>, source_ips: &[String]) -> FirewallRule {
        FirewallRule {
            direction: "in".to_string(),
            protocol: protocol.to_string(),
            port: port.map(String::from),
            source_ips: source_ips.to_vec(),
        }
    }
}

/// A firewall, as reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Firewall {
    /// Numeric ID assigned by the API.
    pub id: i64,
    /// Human-readable name, unique per account.
    pub name: String,
    /// Current rule set.
    #[serde(default)]
    pub rules: Vec<FirewallRule>,
}

#[derive(Deserialize)]
struct FirewallResponse {
    firewall: Firewall,
}

#[derive(Deserialize)]
struct FirewallListResponse {
    firewalls: Vec<Firewall>,
}

/// The standard allowlist rule set: TCP all ports, UDP all ports, and
/// ICMP, each restricted to the given source addresses.
pub fn allowlist_rules(allowed_ips: &[String]) -> Vec<FirewallRule> {
    vec![
        FirewallRule::inbound("tcp", Some("1-65535"), allowed_ips),
        FirewallRule::inbound("udp", Some("1-65535"), allowed_ips),
        FirewallRule::inbound("icmp", None, allowed_ips),
    ]
}

impl HcloudClient {
    /// Look up a firewall by its name. Returns `Ok(None)` when no firewall
    /// of that name exists.
    pub fn find_firewall(&self, name: &str) -> Result<Option<Firewall>, DeployError> {
        let response = self.get_query("/firewalls", &[("name", name)])?;
        let listed: FirewallListResponse = serde_json::from_value(response)?;
        Ok(listed.firewalls.into_iter().next())
    }

    /// Create a firewall with the given rules and apply it to one server.
    pub fn create_firewall(
        &self,
        name: &str,
        rules: &[FirewallRule],
        server_id: i64,
    ) -> Result<Firewall, DeployError> {
        let body = json!({
            "name": name,
            "rules": rules,
            "apply_to": [{"type": "server", "server": {"id": server_id}}],
        });
        let response = self.post("/firewalls", &body)?;
        let created: FirewallResponse = serde_json::from_value(response)?;
        Ok(created.firewall)
    }

    /// Replace the entire rule set of an existing firewall.
    pub fn set_firewall_rules(&self, id: i64, rules: &[FirewallRule]) -> Result<(), DeployError> {
        self.post(
            &format!("/firewalls/{}/actions/set_rules", id),
            &json!({ "rules": rules }),
        )?;
        Ok(())
    }
}
