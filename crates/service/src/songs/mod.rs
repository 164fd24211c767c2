//! Song collection: three layers (repository, storage impls, service).
//!
//! The repository speaks storage primitives (find/insert/$set/delete); the service
//! layers the existence checks and the "found but unchanged" rule on top.

pub mod repository;
pub mod repo;
pub mod service;

pub use repository::{SongRepository, UpdateOutcome};
pub use service::{SongService, SongUpdate};
