//! Core types and logic for the orgdesk organization console.
//!
//! Everything here is independent of HTTP and terminals. The tree, membership
//! and permission modules are pure functions over owned data; [`workflow`]
//! strings them together with a [`directory::OrgDirectory`] backend.

pub mod directory;
pub mod error;
pub mod filter;
pub mod membership;
pub mod model;
pub mod permission;
pub mod sequence;
pub mod tree;
pub mod workflow;

pub use error::{Error, Result};
