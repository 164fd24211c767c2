//! Service layer: business rules for the picture and song collections.
//! - Repositories are traits so handlers depend on a capability, not a backend.
//! - `ServiceError` is the single error vocabulary the HTTP layer maps to statuses.

pub mod errors;
pub mod storage;
pub mod pictures;
pub mod songs;
