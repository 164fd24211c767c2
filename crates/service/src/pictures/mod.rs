//! Picture collection: a file-seeded, in-memory ordered list behind `PictureRepository`.

pub mod repository;
pub mod store;

pub use repository::PictureRepository;
pub use store::PictureStore;
