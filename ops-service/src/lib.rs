pub mod config;
pub mod dispatch;
pub mod error;
pub mod error_response;
pub mod routes;
pub mod state;
pub mod streaming;

pub use config::Config;
pub use state::AppState;

use axum::Router;

pub fn app(config: Config) -> Router {
    routes::router(AppState::new(config))
}
