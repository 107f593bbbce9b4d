//! Frontier module: durable URL state and the shared work queue
//!
//! # Components
//!
//! - `FrontierState`: the four persisted URL sets (crawled, uncrawled,
//!   downloaded, undownloaded)
//! - `Frontier`: mutex-guarded shared handle workers mutate during a run
//! - `WorkQueue` / `WorkItem`: the depth-tagged queue workers drain

mod queue;
mod shared;
mod store;

pub use queue::{WorkItem, WorkQueue};
pub use shared::Frontier;
pub use store::FrontierState;
