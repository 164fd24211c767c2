use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CountResponse { pub length: usize }

/// Picture record; any extra properties are stored and returned verbatim. The
/// string-typed fields accept any JSON value and echo it back unchanged.
#[derive(ToSchema)]
pub struct PictureDoc {
    pub id: i64,
    pub pic_url: Option<String>,
    pub event_country: Option<String>,
    pub event_state: Option<String>,
    pub event_city: Option<String>,
    pub event_date: Option<String>,
}

/// Omitted properties are kept; `id`, when present, must equal the path id.
#[derive(ToSchema)]
pub struct PicturePatchDoc {
    pub id: Option<i64>,
    pub pic_url: Option<String>,
    pub event_country: Option<String>,
    pub event_state: Option<String>,
    pub event_city: Option<String>,
    pub event_date: Option<String>,
}

/// `title` and `lyrics` accept any JSON value; extra properties are kept.
#[derive(ToSchema)]
pub struct SongInputDoc {
    pub id: i64,
    pub title: Option<String>,
    pub lyrics: Option<String>,
}

#[derive(ToSchema)]
pub struct SongDoc {
    /// Storage id as a hex string.
    pub _id: String,
    pub id: i64,
    pub title: Option<String>,
    pub lyrics: Option<String>,
}

#[derive(ToSchema)]
pub struct SongListDoc { pub songs: Vec<SongDoc> }

#[derive(ToSchema)]
pub struct SongPatchDoc {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub lyrics: Option<String>,
}

#[derive(ToSchema)]
pub struct InsertedIdDoc { pub inserted_id: i64 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::pictures::count,
        crate::routes::pictures::list,
        crate::routes::pictures::get,
        crate::routes::pictures::create,
        crate::routes::pictures::update,
        crate::routes::pictures::delete,
        crate::routes::songs::list,
        crate::routes::songs::get,
        crate::routes::songs::create,
        crate::routes::songs::update,
        crate::routes::songs::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CountResponse,
            PictureDoc,
            PicturePatchDoc,
            SongInputDoc,
            SongDoc,
            SongListDoc,
            SongPatchDoc,
            InsertedIdDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "pictures"),
        (name = "songs")
    )
)]
pub struct ApiDoc;
