//! Runtime infrastructure - task loading and mutation execution on Tokio

mod bridge;
mod loader;
mod worker;

pub use bridge::{
    event_channel, EventReceiver, EventSender, Mutation, MutationPhase, RuntimeEvent, Ticket,
};
pub use loader::TaskLoader;
pub use worker::{connect, MutationExecutor, Session};
