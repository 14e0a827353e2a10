//! In-memory stand-in for the Hetzner API. Holds account state in
//! `RefCell`s and lets tests script the status values the poll loop will
//! observe, so orchestration logic can run without a network.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::server::{Ipv4, PublicNet};
use super::{CreatedServer, Firewall, FirewallRule, HcloudApi, Server, ServerSpec, SshKey};
use crate::error::DeployError;

/// Fake provider account. Single-threaded, like everything else here.
pub struct FakeCloud {
    /// Servers currently in the account.
    pub servers: RefCell<Vec<Server>>,
    /// SSH keys currently in the account.
    pub ssh_keys: RefCell<Vec<SshKey>>,
    /// Firewalls currently in the account.
    pub firewalls: RefCell<Vec<Firewall>>,
    /// (firewall id, server id) pairs recorded on firewall creation.
    pub attachments: RefCell<Vec<(i64, i64)>>,
    /// Status values handed out by successive `get_server` calls; the last
    /// entry repeats once the script is exhausted.
    pub statuses: RefCell<VecDeque<String>>,
    /// Root password returned by `create_server` when no key is attached.
    pub root_password: Option<String>,
    /// Number of `get_server` calls observed.
    pub get_server_calls: Cell<usize>,
    /// SSH key id passed to the last `create_server` call, if any.
    pub last_create_key_id: Cell<Option<i64>>,
    /// Server ids whose shutdown action should fail.
    pub fail_shutdown_ids: Vec<i64>,
    /// Server ids whose delete should fail.
    pub fail_delete_ids: Vec<i64>,
    next_id: Cell<i64>,
}

impl FakeCloud {
    pub fn new() -> FakeCloud {
        FakeCloud {
            servers: RefCell::new(vec![]),
            ssh_keys: RefCell::new(vec![]),
            firewalls: RefCell::new(vec![]),
            attachments: RefCell::new(vec![]),
            statuses: RefCell::new(VecDeque::new()),
            root_password: Some("TpFWCs9nBfCrUM8".to_string()),
            get_server_calls: Cell::new(0),
            last_create_key_id: Cell::new(None),
            fail_shutdown_ids: vec![],
            fail_delete_ids: vec![],
            next_id: Cell::new(1),
        }
    }

    /// Script the statuses that successive polls will observe.
    pub fn with_statuses(statuses: &[&str]) -> FakeCloud {
        let fake = FakeCloud::new();
        *fake.statuses.borrow_mut() = statuses.iter().map(|s| s.to_string()).collect();
        fake
    }

    fn take_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Seed a running server into the account, returning its id.
    pub fn add_server(&self, name: &str) -> i64 {
        let id = self.take_id();
        self.servers.borrow_mut().push(Server {
            id,
            name: name.to_string(),
            status: "running".to_string(),
            public_net: PublicNet {
                ipv4: Some(Ipv4 {
                    ip: format!("203.0.113.{}", id),
                }),
            },
        });
        id
    }

    /// Seed an SSH key into the account, returning its id.
    pub fn add_ssh_key(&self, name: &str) -> i64 {
        let id = self.take_id();
        self.ssh_keys.borrow_mut().push(SshKey {
            id,
            name: name.to_string(),
            fingerprint: None,
        });
        id
    }

    fn next_status(&self) -> Option<String> {
        let mut script = self.statuses.borrow_mut();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }

    fn not_found(what: &str) -> DeployError {
        DeployError::Api {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

impl HcloudApi for FakeCloud {
    fn resolve_ssh_key(&self, name: &str) -> Result<Option<SshKey>, DeployError> {
        Ok(self
            .ssh_keys
            .borrow()
            .iter()
            .find(|k| k.name == name)
            .cloned())
    }

    fn create_ssh_key(&self, name: &str, _public_key: &str) -> Result<SshKey, DeployError> {
        if self.ssh_keys.borrow().iter().any(|k| k.name == name) {
            return Err(DeployError::Api {
                status: 409,
                message: "SSH key with the same name already exists".to_string(),
            });
        }
        let key = SshKey {
            id: self.take_id(),
            name: name.to_string(),
            fingerprint: None,
        };
        self.ssh_keys.borrow_mut().push(key.clone());
        Ok(key)
    }

    fn delete_ssh_key(&self, id: i64) -> Result<(), DeployError> {
        let mut keys = self.ssh_keys.borrow_mut();
        let before = keys.len();
        keys.retain(|k| k.id != id);
        if keys.len() == before {
            return Err(Self::not_found("SSH key"));
        }
        Ok(())
    }

    fn create_server(
        &self,
        spec: &ServerSpec,
        ssh_key: Option<&SshKey>,
    ) -> Result<CreatedServer, DeployError> {
        self.last_create_key_id.set(ssh_key.map(|k| k.id));
        let server = Server {
            id: self.take_id(),
            name: spec.name.clone(),
            status: "initializing".to_string(),
            public_net: PublicNet {
                ipv4: Some(Ipv4 {
                    ip: "203.0.113.10".to_string(),
                }),
            },
        };
        self.servers.borrow_mut().push(server.clone());
        let root_password = match ssh_key {
            Some(_) => None,
            None => self.root_password.clone(),
        };
        Ok(CreatedServer {
            server,
            root_password,
        })
    }

    fn get_server(&self, id: i64) -> Result<Server, DeployError> {
        self.get_server_calls.set(self.get_server_calls.get() + 1);
        let mut servers = self.servers.borrow_mut();
        let server = servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Self::not_found("server"))?;
        if let Some(status) = self.next_status() {
            server.status = status;
        }
        Ok(server.clone())
    }

    fn list_servers(&self) -> Result<Vec<Server>, DeployError> {
        Ok(self.servers.borrow().clone())
    }

    fn shutdown_server(&self, id: i64) -> Result<(), DeployError> {
        if self.fail_shutdown_ids.contains(&id) {
            return Err(DeployError::Api {
                status: 423,
                message: "server is locked".to_string(),
            });
        }
        Ok(())
    }

    fn delete_server(&self, id: i64) -> Result<(), DeployError> {
        if self.fail_delete_ids.contains(&id) {
            return Err(DeployError::Api {
                status: 500,
                message: "internal server error".to_string(),
            });
        }
        let mut servers = self.servers.borrow_mut();
        let before = servers.len();
        servers.retain(|s| s.id != id);
        if servers.len() == before {
            return Err(Self::not_found("server"));
        }
        Ok(())
    }

    fn find_firewall(&self, name: &str) -> Result<Option<Firewall>, DeployError> {
        Ok(self
            .firewalls
            .borrow()
            .iter()
            .find(|f| f.name == name)
            .cloned())
    }

    fn create_firewall(
        &self,
        name: &str,
        rules: &[FirewallRule],
        server_id: i64,
    ) -> Result<Firewall, DeployError> {
        let firewall = Firewall {
            id: self.take_id(),
            name: name.to_string(),
            rules: rules.to_vec(),
        };
        self.firewalls.borrow_mut().push(firewall.clone());
        self.attachments.borrow_mut().push((firewall.id, server_id));
        Ok(firewall)
    }

    fn set_firewall_rules(&self, id: i64, rules: &[FirewallRule]) -> Result<(), DeployError> {
        let mut firewalls = self.firewalls.borrow_mut();
        let firewall = firewalls
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Self::not_found("firewall"))?;
        firewall.rules = rules.to_vec();
        Ok(())
    }
}
