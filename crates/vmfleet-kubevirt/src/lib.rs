//! KubeVirt instance group provider.
//!
//! Implements the `vmfleet_core::InstanceGroup` contract on top of the
//! KubeVirt API: workers are `VirtualMachine` objects in one namespace,
//! grouped by a label selector, and their lifecycle is driven entirely by
//! the control plane once created. This crate keeps no durable state of
//! its own between calls.

pub mod client;
pub mod config;
pub mod http;
pub mod mock;
pub mod provider;
pub mod quantity;
pub mod resources;
pub mod session;
pub mod status;

pub use client::VirtClient;
pub use config::GroupConfig;
pub use http::HttpVirtClient;
pub use provider::{KubevirtGroup, VERSION};
pub use session::{Session, SessionSource};
