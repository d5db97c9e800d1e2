//! Task lists kept in two on-chain contracts
//!
//! The Simple store holds a flat list with one-way completion; the TodoWeb3
//! store holds tasks addressed `1..=taskCount`. This crate resolves the
//! connected network, binds both contracts, loads their lists and pushes
//! user mutations through submit → confirm → reload. Rendering is left to
//! the caller.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
