use crate::state::AppState;
use axum::{Router, routing::get};

mod location;


pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(location::router())
}

async fn root() -> &'static str {
    "foodweb API root here"
}
