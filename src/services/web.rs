//! Axum-based HTTP server for the rig API.
//!
//! Provides REST endpoints for:
//! - GET `/api/state` - Last commanded actuator state
//! - POST `/api/motor` - Set motor frequency (`{"frequency": -500}`)
//! - POST `/api/motor/on` - Resume at the last commanded frequency
//! - POST `/api/motor/off` - Stop the motor
//! - POST `/api/light` - Set light brightness (`{"brightness": 40}`)
//! - GET `/api/system/version` - Deployed commit hash
//! - POST `/api/system/update` - Fast-forward the deployed checkout
//! - GET `/on`, GET `/off` - Older clients' aliases for motor on/off
//!
//! | Failure | Status |
//! |---------|--------|
//! | Body is not valid JSON | 400 |
//! | Field has the wrong type (float, string) | 422 |
//! | Value out of range | 422 |
//! | Hardware write failed | 500 |
//! | git failed | 500 |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::{LightCommand, MotorCommand, Rig};

use super::api::{
    ApiResponse, CommandResponse, LightRequest, MotorRequest, StateResponse,
    SystemVersionResponse,
};
use super::system;

/// Handler return type: status plus JSON envelope.
type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> ApiResult<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn fail<T>(status: StatusCode, message: impl Into<String>) -> ApiResult<T> {
    (status, Json(ApiResponse::err(message)))
}

/// Shared state for all handlers.
pub struct AppState {
    /// The rig
    pub rig: Arc<Rig>,
    /// Git checkout for version/update
    pub repo_dir: PathBuf,
}

/// Decode a request body; an empty body means all defaults.
fn decode<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
}

/// Well-formed JSON with a wrongly typed field is 422, anything else 400.
fn rejection(err: &serde_json::Error) -> StatusCode {
    if err.is_data() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_REQUEST
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/state - Returns the last commanded state
async fn get_state(State(state): State<Arc<AppState>>) -> ApiResult<StateResponse> {
    let rig = &state.rig;
    ok(StateResponse::new(&rig.state(), rig.backend_kind()))
}

/// POST /api/motor - Set motor frequency
///
/// Accepts JSON: `{"frequency": -500}`
async fn set_motor(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<CommandResponse> {
    let req: MotorRequest = match decode(&body) {
        Ok(req) => req,
        Err(e) => return fail(rejection(&e), format!("Invalid motor request: {}", e)),
    };

    let cmd = match MotorCommand::new(req.frequency) {
        Ok(cmd) => cmd,
        Err(e) => return fail(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    match state.rig.apply_motor(cmd) {
        Ok(()) if cmd.is_stop() => ok(CommandResponse::accepted("stopped")),
        Ok(()) => ok(CommandResponse::accepted("running")),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /api/motor/on - Resume at the last commanded frequency
async fn motor_on(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    match state.rig.resume_motor() {
        Ok(cmd) => ok(CommandResponse::accepted(format!(
            "running at {}",
            cmd.frequency()
        ))),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /api/motor/off - Stop the motor
async fn motor_off(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    match state.rig.apply_motor(MotorCommand::stop()) {
        Ok(()) => ok(CommandResponse::accepted("stopped")),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /api/light - Set light brightness
///
/// Accepts JSON: `{"brightness": 40}`
async fn set_light(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<CommandResponse> {
    let req: LightRequest = match decode(&body) {
        Ok(req) => req,
        Err(e) => return fail(rejection(&e), format!("Invalid light request: {}", e)),
    };

    let cmd = match LightCommand::new(req.brightness) {
        Ok(cmd) => cmd,
        Err(e) => return fail(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    match state.rig.apply_light(cmd) {
        Ok(()) => ok(CommandResponse::accepted("brightness_set")),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/system/version - Deployed commit
async fn system_version(State(state): State<Arc<AppState>>) -> ApiResult<SystemVersionResponse> {
    match system::commit_hash(&state.repo_dir).await {
        Ok(commit_hash) => ok(SystemVersionResponse {
            commit_hash,
            simulated: state.rig.backend_is_simulated(),
        }),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /api/system/update - Pull the deployed checkout
async fn system_update(State(state): State<Arc<AppState>>) -> ApiResult<SystemVersionResponse> {
    match system::update(&state.repo_dir).await {
        Ok(commit_hash) => ok(SystemVersionResponse {
            commit_hash,
            simulated: state.rig.backend_is_simulated(),
        }),
        Err(e) => {
            log::error!("{}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    fail::<()>(StatusCode::NOT_FOUND, "Not found")
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Git checkout for version/update
    pub repo_dir: PathBuf,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
            repo_dir: config.repo_dir.clone(),
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router(rig: Arc<Rig>, config: &WebServerConfig) -> Router {
    let state = Arc::new(AppState {
        rig,
        repo_dir: config.repo_dir.clone(),
    });

    let mut router = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/motor", post(set_motor))
        .route("/api/motor/on", post(motor_on))
        .route("/api/motor/off", post(motor_off))
        .route("/api/light", post(set_light))
        .route("/api/system/version", get(system_version))
        .route("/api/system/update", post(system_update))
        .route("/on", get(motor_on))
        .route("/off", get(motor_off))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server
///
/// This function blocks until the server is shut down.
pub async fn run_server(rig: Arc<Rig>, config: WebServerConfig) -> Result<(), std::io::Error> {
    let router = build_router(rig, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Web server listening on http://{}", config.addr);

    axum::serve(listener, router).await
}
