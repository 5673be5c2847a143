use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use clap::Parser;
use restrec::{init_tracing, services::ingest, AppState, Config, Dataset, RecError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    restaurant: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn status_for(error: &RecError) -> StatusCode {
    match error {
        RecError::MissingNameColumn { .. }
        | RecError::EmptyDataset
        | RecError::EmptyVocabulary
        | RecError::UnknownColumn(_)
        | RecError::RowTooLong { .. }
        | RecError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecError::NotTrained | RecError::StaleModel { .. } => StatusCode::CONFLICT,
        RecError::UnknownRestaurant(_) => StatusCode::NOT_FOUND,
        RecError::NoDataset => StatusCode::BAD_REQUEST,
        RecError::CorruptArtifact(_) | RecError::Io(_) | RecError::TaskFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn respond<T>(result: restrec::Result<T>) -> ApiResult<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Request failed: {}", e);
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "restrec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn upload_dataset(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<restrec::ColumnReport> {
    match ingest::read_csv_str(&body) {
        Ok(dataset) => load_and_report(&state, dataset).await,
        Err(e) => respond(Err(e)),
    }
}

async fn upload_records(
    State(state): State<AppState>,
    Json(records): Json<Vec<serde_json::Map<String, serde_json::Value>>>,
) -> ApiResult<restrec::ColumnReport> {
    match Dataset::from_records(records) {
        Ok(dataset) => load_and_report(&state, dataset).await,
        Err(e) => respond(Err(e)),
    }
}

/// A missing name column still loads the dataset; the report goes back with the error.
async fn load_and_report(state: &AppState, dataset: Dataset) -> ApiResult<restrec::ColumnReport> {
    let (report, assignment) = state.load_dataset(dataset).await;
    match assignment {
        Ok(_) => respond(Ok(report)),
        Err(e) => (
            status_for(&e),
            Json(ApiResponse {
                success: false,
                data: Some(report),
                message: e.to_string(),
            }),
        ),
    }
}

async fn get_columns(State(state): State<AppState>) -> ApiResult<restrec::ColumnReport> {
    respond(state.column_report().await)
}

async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    respond(state.restaurants().await)
}

async fn train_model(State(state): State<AppState>) -> ApiResult<restrec::TrainingReport> {
    respond(state.train().await)
}

async fn reset_model(State(state): State<AppState>) -> ApiResult<()> {
    respond(state.reset_model().await)
}

async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> ApiResult<restrec::RecommendationResponse> {
    respond(state.recommend(&params.restaurant).await)
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/dataset", post(upload_dataset))
        .route("/dataset/records", post(upload_records))
        .route("/dataset/columns", get(get_columns))
        .route("/restaurants", get(list_restaurants))
        .route("/train", post(train_model))
        .route("/model", delete(reset_model))
        .route("/recommendations", get(get_recommendations))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
        .with_state(state)
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        info!("Config file not found, using default configuration");
        Ok(Config::default())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &args.log_level);
    }
    init_tracing();

    let config = load_config(&args.config)?;
    info!("Starting restaurant recommendation server with config: {:?}", config.server);

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
