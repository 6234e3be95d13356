//! Retrace - client-side search over a browsing-history capture
//!
//! This library implements the search subsystem of a reading-history tool:
//! query tokenization with CJK-aware segmentation, multi-term matching with
//! character-offset span tracking, span merging into highlight segments, and
//! the storage and remote plumbing the history view sits on.
//!
//! The search core (`segment`, `search`, `highlight`) is pure and
//! synchronous; sessions wrap it in a debounced background task.

pub mod highlight;
pub mod interface;
pub mod models;
pub mod remote;
pub mod segment;
pub mod search;
pub mod session;
pub mod storage;
mod store;

pub use interface::*;
pub use store::{HistoryStore, DEFAULT_HISTORY_LIMIT, HISTORY_KEY, HISTORY_LIMIT_KEY};
