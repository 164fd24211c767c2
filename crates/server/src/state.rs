use std::sync::Arc;

use service::{pictures::PictureRepository, songs::SongService};

/// Shared handler state: the two collections, injected as capabilities.
#[derive(Clone)]
pub struct AppState {
    pub pictures: Arc<dyn PictureRepository>,
    pub songs: SongService,
}

impl AppState {
    pub fn new(pictures: Arc<dyn PictureRepository>, songs: SongService) -> Self {
        Self { pictures, songs }
    }
}
