//! Error taxonomy for the deploy pipeline. Every fatal error maps to a
//! documented process exit code, so CI jobs can branch on the result.

extern crate custom_error;
use custom_error::custom_error;

// Note the use of braces rather than parentheses.
custom_error! {pub DeployError
    Config{msg: String} = "{msg}",
    ProvisionTimeout{last_status: String, elapsed_secs: u64, timeout_secs: u64} =
        "Server did not reach 'running' status within {timeout_secs} seconds. Last status: {last_status}",
    Network{source: reqwest::Error} = "network error talking to the Hetzner API",
    Api{status: u16, message: String} = "Hetzner API request failed ({status}): {message}",
    Json{source: serde_json::Error} = "could not parse JSON from API response",
}

impl DeployError {
    /// Process exit code for this error: 1 for configuration and provider
    /// failures, 2 for a provisioning timeout.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::ProvisionTimeout { .. } => 2,
            _ => 1,
        }
    }
}
