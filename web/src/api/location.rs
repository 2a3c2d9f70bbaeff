use crate::{
    error::{self, Error},
    state::AppState,
};
use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use libfood::{
    empty_string_as_none,
    location::{Location, NewLocation},
    search::{CategoryGroup, matches_query},
};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(list_locations).post(add_location))
        .route("/locations/{id}", get(show_location))
}

#[derive(Deserialize, Debug, Default)]
struct ListParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    q: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    group: Option<String>,
}

impl ListParams {
    fn group(&self) -> Result<CategoryGroup, libfood::Error> {
        match &self.group {
            None => Ok(CategoryGroup::All),
            Some(g) => CategoryGroup::from_str(g).map_err(|_| {
                libfood::Error::validation("group", format!("Unknown category group '{g}'"))
            }),
        }
    }
}

async fn list_locations(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Location>>, error::Error> {
    let Query(params) = params.map_err(Error::UnprocessableEntityQueryRejection)?;
    let group = params.group()?;
    let mut locations = Location::load_all(group.to_filter(), &state.db).await?;
    if let Some(q) = &params.q {
        locations.retain(|loc| matches_query(loc, q));
    }
    debug!(?params, n = locations.len(), "listing locations");
    Ok(Json(locations))
}

async fn show_location(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Location>, error::Error> {
    // anything that isn't an id can't name an existing location
    let id: i64 = id
        .parse()
        .map_err(|_| Error::NotFound("Location not found".to_string()))?;
    let location = Location::load(id, &state.db).await?;
    Ok(Json(location))
}

async fn add_location(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, error::Error> {
    let Json(payload) = payload?;
    let new = NewLocation::from_json(&payload)?;
    let location = new.insert(&state.db).await?;
    info!(id = location.id, location = %location.name, "Added location");
    Ok((StatusCode::CREATED, Json(location)))
}
