//! A thin client for the food map HTTP API that caches the location list
use libfood::location::{Location, NewLocation};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, trace};

#[derive(thiserror::Error, Debug)]
pub(crate) enum ClientError {
    #[error("Unable to reach the server: {0}")]
    Transient(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected {
        message: String,
        field: Option<String>,
    },
    #[error("Location {0} not found")]
    NotFound(i64),
    #[error("Server responded with status {0}")]
    Status(StatusCode),
}

/// The error body the server sends along with a rejected request
#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Debug)]
pub(crate) struct LocationClient {
    http: reqwest::Client,
    base: String,
    cache: Option<Vec<Location>>,
}

impl LocationClient {
    pub(crate) fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            cache: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Returns every location on the server. The list is fetched once and
    /// served from the cache until [LocationClient::invalidate] is called or
    /// a location is created.
    pub(crate) async fn locations(&mut self) -> Result<&[Location], ClientError> {
        let locations = match self.cache.take() {
            Some(cached) => {
                trace!(n = cached.len(), "using cached locations");
                cached
            }
            None => {
                let response = self.http.get(self.url("/locations")).send().await?;
                let locations: Vec<Location> = check(response).await?.json().await?;
                debug!(n = locations.len(), "fetched locations");
                locations
            }
        };
        Ok(self.cache.insert(locations).as_slice())
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn invalidate(&mut self) {
        self.cache = None;
    }

    pub(crate) async fn location(&self, id: i64) -> Result<Location, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/locations/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        Ok(check(response).await?.json().await?)
    }

    /// Creates a location on the server and drops the cached list so the
    /// next call to [LocationClient::locations] includes it
    pub(crate) async fn create(&mut self, location: &NewLocation) -> Result<Location, ClientError> {
        let response = self
            .http
            .post(self.url("/locations"))
            .json(location)
            .send()
            .await?;
        let created: Location = check(response).await?.json().await?;
        debug!(id = created.id, "created location");
        self.invalidate();
        Ok(created)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::BAD_REQUEST {
        let body: ErrorBody = response.json().await?;
        return Err(ClientError::Rejected {
            message: body.message,
            field: body.field,
        });
    }
    Err(ClientError::Status(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::{Value, json};
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use test_log::test;

    #[derive(Default)]
    struct Stub {
        locations: Mutex<Vec<Value>>,
        list_calls: AtomicUsize,
    }

    async fn list(State(stub): State<Arc<Stub>>) -> Json<Vec<Value>> {
        stub.list_calls.fetch_add(1, Ordering::SeqCst);
        Json(stub.locations.lock().expect("poisoned").clone())
    }

    async fn show(State(stub): State<Arc<Stub>>, Path(id): Path<i64>) -> impl IntoResponse {
        let locations = stub.locations.lock().expect("poisoned");
        match locations.iter().find(|l| l["id"] == id) {
            Some(l) => (StatusCode::OK, Json(l.clone())),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Location not found"})),
            ),
        }
    }

    async fn create(State(stub): State<Arc<Stub>>, Json(mut body): Json<Value>) -> impl IntoResponse {
        if body["latitude"].as_f64().is_none_or(|lat| lat.abs() > 90.0) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "latitude must be between -90 and 90", "field": "latitude"})),
            );
        }
        let mut locations = stub.locations.lock().expect("poisoned");
        body["id"] = json!(locations.len() + 1);
        locations.push(body.clone());
        (StatusCode::CREATED, Json(body))
    }

    async fn teapot() -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    async fn serve(stub: Arc<Stub>) -> String {
        let app = Router::new()
            .route("/locations", get(list).post(create))
            .route("/locations/{id}", get(show))
            .route("/broken/locations", get(teapot))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/")
    }

    fn location(id: i64, name: &str, category: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "latitude": 25.08,
            "longitude": 121.57,
            "category": category,
            "icon": null,
            "brand": null,
            "address": null,
            "tags": [],
        })
    }

    #[test(tokio::test)]
    async fn test_list_is_cached() {
        let stub = Arc::new(Stub::default());
        stub.locations
            .lock()
            .expect("poisoned")
            .extend([location(1, "Office", "landmark"), location(2, "Cafe", "coffee")]);
        let mut client = LocationClient::new(serve(stub.clone()).await);
        assert!(!client.is_cached());

        let names: Vec<String> = client
            .locations()
            .await
            .expect("Failed to list")
            .iter()
            .map(|l| l.name.clone())
            .collect();
        assert_eq!(names, vec!["Office", "Cafe"]);
        assert!(client.is_cached());
        assert_eq!(client.locations().await.expect("Failed to list").len(), 2);
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);

        client.invalidate();
        assert_eq!(client.locations().await.expect("Failed to list").len(), 2);
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 2);
    }

    #[test(tokio::test)]
    async fn test_create_invalidates_cache() {
        let stub = Arc::new(Stub::default());
        stub.locations
            .lock()
            .expect("poisoned")
            .push(location(1, "Office", "landmark"));
        let mut client = LocationClient::new(serve(stub.clone()).await);
        assert_eq!(client.locations().await.expect("Failed to list").len(), 1);

        let created = client
            .create(&NewLocation::new("Dumplings", 25.07, 121.58).with_category("dumplings"))
            .await
            .expect("Failed to create");
        assert_eq!(created.id, 2);
        assert_eq!(created.category, "dumplings");
        assert!(!client.is_cached());

        let locations = client.locations().await.expect("Failed to list");
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[1].name, "Dumplings");
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 2);
    }

    #[test(tokio::test)]
    async fn test_rejected_create_keeps_cache() {
        let stub = Arc::new(Stub::default());
        let mut client = LocationClient::new(serve(stub.clone()).await);
        assert!(client.locations().await.expect("Failed to list").is_empty());

        let err = client
            .create(&NewLocation::new("Nowhere", 999.0, 0.0))
            .await
            .expect_err("Create should have been rejected");
        match err {
            ClientError::Rejected { message, field } => {
                assert_eq!(message, "latitude must be between -90 and 90");
                assert_eq!(field.as_deref(), Some("latitude"));
            }
            e => panic!("Unexpected error {e:?}"),
        }
        assert!(client.is_cached());
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);
    }

    #[test(tokio::test)]
    async fn test_show() {
        let stub = Arc::new(Stub::default());
        stub.locations
            .lock()
            .expect("poisoned")
            .push(location(1, "Office", "landmark"));
        let client = LocationClient::new(serve(stub).await);
        let loc = client.location(1).await.expect("Failed to load");
        assert_eq!(loc.name, "Office");
        assert!(matches!(
            client.location(7).await,
            Err(ClientError::NotFound(7))
        ));
    }

    #[test(tokio::test)]
    async fn test_errors() {
        let stub = Arc::new(Stub::default());
        let base = serve(stub).await;
        let mut client = LocationClient::new(format!("{base}broken"));
        assert!(matches!(
            client.locations().await,
            Err(ClientError::Status(StatusCode::IM_A_TEAPOT))
        ));
        assert!(!client.is_cached());

        // nothing listens on port 9 of the loopback interface
        let mut client = LocationClient::new("http://127.0.0.1:9");
        assert!(matches!(
            client.locations().await,
            Err(ClientError::Transient(_))
        ));
    }
}
