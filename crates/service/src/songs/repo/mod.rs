pub mod mongo;

pub use mongo::MongoSongRepository;
