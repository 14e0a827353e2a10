//! The provisioning core: submit one server-creation request, then block
//! until the server reports `running` or a wall-clock deadline elapses.
//!
//! The provider offers no push-based readiness signal, so this is a
//! fixed-interval poll loop. The clock and sleep are injected via [Clock]
//! so tests can simulate elapsed time without real delays.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::DeployError;
use crate::hcloud::server::STATUS_RUNNING;
use crate::hcloud::{HcloudApi, Server, ServerSpec, SshKey};

/// Seconds between status polls. Fixed; there is no backoff.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Bounded-wait settings for the poll loop.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Wall-clock budget for the wait, measured from after the creation
    /// request returns. Zero is allowed and fails after a single poll.
    pub timeout_secs: u64,
    /// Sleep between polls. Always [POLL_INTERVAL_SECS] in production.
    pub poll_interval_secs: u64,
}

impl WaitPolicy {
    /// Policy with the given timeout and the standard poll interval.
    pub fn with_timeout(timeout_secs: u64) -> WaitPolicy {
        WaitPolicy {
            timeout_secs,
            poll_interval_secs: POLL_INTERVAL_SECS,
        }
    }
}

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionResult {
    /// The server, with `status == "running"`. The public IPv4 address is
    /// expected to be populated by now, but that is not enforced; whatever
    /// the provider reports is surfaced as-is.
    pub server: Server,
    /// Generated root password, present only when no SSH key was attached.
    pub root_password: Option<String>,
}

/// Time source for the poll loop.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
    /// Block for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock [Clock] backed by `std::time` and `thread::sleep`. The sleep
/// blocks the whole process; there is no cancellation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

fn validate(spec: &ServerSpec) -> Result<(), DeployError> {
    for (field, value) in [
        ("server name", &spec.name),
        ("server type", &spec.server_type),
        ("image", &spec.image),
    ] {
        if value.is_empty() {
            return Err(DeployError::Config {
                msg: format!("{} must not be empty", field),
            });
        }
    }
    Ok(())
}

// Key resolution failure is a deliberate degraded-mode fallback: the server
// is created with a generated root password instead. Transport errors still
// propagate.
fn resolve_key(
    api: &dyn HcloudApi,
    spec: &ServerSpec,
) -> Result<Option<SshKey>, DeployError> {
    let name = match &spec.ssh_key_name {
        Some(name) => name,
        None => return Ok(None),
    };
    info!("Using SSH key: {}", name);
    match api.resolve_ssh_key(name)? {
        Some(key) => Ok(Some(key)),
        None => {
            warn!(
                "SSH key '{}' not found. Server will be created with password authentication.",
                name
            );
            Ok(None)
        }
    }
}

/// Create one server and block until it is running, or until
/// `policy.timeout_secs` elapses.
///
/// The loop always performs at least one status fetch before it can time
/// out, and a `running` status observed after the nominal deadline still
/// counts as success, so the wait can overshoot the deadline by up to one
/// poll interval. Creation latency is not charged against the budget.
pub fn provision(
    api: &dyn HcloudApi,
    clock: &dyn Clock,
    spec: &ServerSpec,
    policy: &WaitPolicy,
) -> Result<ProvisionResult, DeployError> {
    validate(spec)?;
    let ssh_key = resolve_key(api, spec)?;
    info!(
        "Creating server '{}' with type '{}' and image '{}'...",
        spec.name, spec.server_type, spec.image
    );
    let created = api.create_server(spec, ssh_key.as_ref())?;
    info!("Server created with ID: {}", created.server.id);
    info!(
        "Waiting for server to become ready (timeout: {} seconds)...",
        policy.timeout_secs
    );

    let start = clock.now();
    loop {
        let server = api.get_server(created.server.id)?;
        let elapsed = clock.now().duration_since(start).as_secs_f64();
        info!(
            "Server status: {} (waited {:.1}s, timeout: {}s)",
            server.status, elapsed, policy.timeout_secs
        );
        if server.status == STATUS_RUNNING {
            info!("Server is ready after {:.1} seconds", elapsed);
            return Ok(ProvisionResult {
                server,
                root_password: created.root_password,
            });
        }
        if elapsed > policy.timeout_secs as f64 {
            return Err(DeployError::ProvisionTimeout {
                last_status: server.status,
                elapsed_secs: elapsed as u64,
                timeout_secs: policy.timeout_secs,
            });
        }
        clock.sleep(Duration::from_secs(policy.poll_interval_secs));
    }
}
