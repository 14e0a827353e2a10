//! hcloud-deploy, thin sequential wrappers around the Hetzner Cloud API
//! for automated deployment pipelines: create a server and wait for it to
//! boot, create-or-replace an SSH key, apply an IP allowlist firewall to
//! every server, and tear servers down again.
//!
//! Everything is synchronous blocking I/O; the only suspension point is
//! the fixed-interval sleep in [crate::provision]'s poll loop. Results are
//! written to stdout as `KEY=VALUE` lines for consumption by later
//! pipeline steps.

#![warn(missing_docs)]
#[macro_use]
extern crate log;

pub mod allowlist;
pub mod config;
pub mod error;
pub mod hcloud;
pub mod keys;
pub mod provision;
pub mod reaper;
