//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based wallet provider and contract bindings
//! - Task loading and the mutation executor
//! - The command/event types passed back to the state container

pub mod ethereum;
pub mod runtime;
