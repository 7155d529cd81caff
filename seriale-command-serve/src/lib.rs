use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, get_service, post},
    BoxError, Json, Router, Server,
};
use seriale_common::{
    models::{Category, Document},
    Conf, Context as _,
};
use seriale_queries::{AddSeries, CollectionError, SeriesRef, SetAboutText, UpdateSeason};
use seriale_store::{JsonStore, Storage};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub type SharedStore = Arc<dyn Storage>;

#[tracing::instrument(skip(conf), err)]
pub async fn run(conf: &Conf) -> Result<(), seriale_common::Report> {
    let store = JsonStore::from_conf(conf);
    store.ensure_ready();

    let addr: SocketAddr = conf
        .address
        .parse()
        .with_context(|| format!("invalid listen address `{}`", conf.address))?;

    let app = router(Arc::new(store), Path::new(&conf.static_dir));

    tracing::info!("starting on `{}`", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

pub fn router(store: SharedStore, static_dir: &Path) -> Router {
    let media_dir = static_dir.join("media");

    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/update-text", post(update_text))
        .route("/api/add-series", post(add_series))
        .route("/api/update-season", post(update_season))
        .route("/api/delete-series", post(delete_series))
        .route("/api/toggle-favorite", post(toggle_favorite))
        .route(
            "/",
            get_service(ServeFile::new(static_dir.join("index.html"))).handle_error(io_error),
        )
        .route(
            "/admin.html",
            get_service(ServeFile::new(static_dir.join("admin.html"))).handle_error(io_error),
        )
        .route(
            "/favicon.ico",
            get_service(ServeFile::new(media_dir.join("favicon.png"))).handle_error(io_error),
        )
        .nest(
            "/media",
            get_service(ServeDir::new(media_dir)).handle_error(io_error),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, String::new())
                    } else {
                        tracing::error!(error = %error, "unhandled middleware error");

                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    }
                }))
                .load_shed()
                .concurrency_limit(1024)
                .timeout(Duration::from_secs(10))
                .layer(Extension(store))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
}

async fn io_error(err: std::io::Error) -> impl IntoResponse {
    tracing::error!(error = %err, "unable to serve static file");

    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

// Storage calls are plain blocking file I/O.
async fn blocking<F, T>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(Error::from_any)
}

#[derive(Debug, serde::Serialize)]
struct Message {
    message: String,
}

impl Message {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, serde::Serialize)]
struct FavoriteToggled {
    message: &'static str,
    favorite: bool,
}

fn collection_label(category: Category) -> &'static str {
    match category {
        Category::Series => "seriale",
        Category::MiniSeries => "miniseriale",
    }
}

async fn get_data(Extension(store): Extension<SharedStore>) -> Result<Json<Document>, Error> {
    let document = blocking(move || seriale_queries::get_all(&*store)).await?;

    Ok(Json(document))
}

async fn update_text(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<SetAboutText>,
) -> Result<impl IntoResponse, Error> {
    blocking(move || seriale_queries::set_about_text(&*store, req)).await??;

    Ok(Message::new("Zapisano tekst!"))
}

async fn add_series(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<AddSeries>,
) -> Result<impl IntoResponse, Error> {
    let category = blocking(move || seriale_queries::add_series(&*store, req)).await??;

    Ok(Message::new(format!("Dodano do {}!", collection_label(category))))
}

async fn update_season(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<UpdateSeason>,
) -> Result<impl IntoResponse, Error> {
    blocking(move || seriale_queries::update_season_status(&*store, req)).await??;

    Ok(Message::new("Sezon zaktualizowany!"))
}

async fn delete_series(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<SeriesRef>,
) -> Result<impl IntoResponse, Error> {
    blocking(move || seriale_queries::delete_series(&*store, req)).await??;

    Ok(Message::new("Serial usunięty!"))
}

async fn toggle_favorite(
    Extension(store): Extension<SharedStore>,
    Json(req): Json<SeriesRef>,
) -> Result<impl IntoResponse, Error> {
    let favorite = blocking(move || seriale_queries::toggle_favorite(&*store, req)).await??;

    Ok(Json(FavoriteToggled {
        message: "Status ulubionych zmieniony!",
        favorite,
    }))
}

#[derive(Debug)]
pub enum Error {
    Collection(CollectionError),
    Internal(seriale_common::Report),
}

impl Error {
    pub fn from_any<A>(err: A) -> Self
    where
        A: Into<seriale_common::Report>,
    {
        Self::Internal(err.into())
    }
}

impl From<CollectionError> for Error {
    fn from(err: CollectionError) -> Self {
        Self::Collection(err)
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum_core::response::Response {
        let (status, message) = match self {
            Error::Collection(err) => {
                let (status, message) = match &err {
                    CollectionError::UnknownCategory(_) => {
                        (StatusCode::BAD_REQUEST, "Błąd: nieznana kategoria")
                    }
                    CollectionError::SeriesNotFound(_) => {
                        (StatusCode::NOT_FOUND, "Błąd: serial nie znaleziony")
                    }
                    CollectionError::SeasonNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "Błąd: sezon nie znaleziony")
                    }
                    CollectionError::TooManySeasons(_) => {
                        (StatusCode::BAD_REQUEST, "Błąd: za dużo sezonów")
                    }
                    CollectionError::StorageUnavailable(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Błąd: nie udało się zapisać danych",
                    ),
                };

                if status.is_server_error() {
                    tracing::error!(error = %err, "error handling request");
                } else {
                    tracing::debug!(error = %err, "rejected request");
                }

                (status, message)
            }
            Error::Internal(err) => {
                tracing::error!(error = ?err, "error handling request");

                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, Message::new(message)).into_response()
    }
}
