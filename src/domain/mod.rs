//! Domain models: task records, network deployments and the error taxonomy
//!
//! Nothing here performs I/O; the infrastructure layer maps chain data
//! into these types.

mod error;
mod network;
mod task;

pub use error::TodoError;
pub use network::{parse_chain_id, ContractEntry, NetworkConfig, NetworkEntry, ResolvedNetwork};
pub use task::{apply_filter, CountedTask, SimpleTask, TaskFilter, TaskRow, TaskSource};
