//! Reqwest-backed places service adapter.
//!
//! This adapter owns transport details only: endpoint layout, auth header,
//! timeout, HTTP status mapping and JSON decoding into records.

use crate::config::ApiConfig;
use crate::model::record::{
    AvatarUpdate, NewPlace, PlaceId, PlaceRecord, ProfileUpdate, UserRecord,
};
use crate::service::places_service::{PlacesService, ServiceError, ServiceResult};
use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// REST adapter for the places API.
pub struct HttpPlacesService {
    client: Client,
    root: String,
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpPlacesService {
    /// Builds an adapter with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            root: api_root(config),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.root, path);
        debug!("event=http_request module=http_service method={method} path={path}");
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, self.token.as_str())
            .header(header::ACCEPT, "application/json")
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|err| ServiceError::Decode(err.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> ServiceResult<Vec<u8>> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PlacesService for HttpPlacesService {
    async fn get_user(&self) -> ServiceResult<UserRecord> {
        self.fetch(self.request(Method::GET, "users/me")).await
    }

    async fn update_user(&self, update: &ProfileUpdate) -> ServiceResult<UserRecord> {
        self.fetch(self.request(Method::PATCH, "users/me").json(update))
            .await
    }

    async fn update_user_avatar(&self, update: &AvatarUpdate) -> ServiceResult<UserRecord> {
        self.fetch(self.request(Method::PATCH, "users/me/avatar").json(update))
            .await
    }

    async fn get_places(&self) -> ServiceResult<Vec<PlaceRecord>> {
        self.fetch(self.request(Method::GET, "cards")).await
    }

    async fn create_place(&self, place: &NewPlace) -> ServiceResult<PlaceRecord> {
        self.fetch(self.request(Method::POST, "cards").json(place))
            .await
    }

    async fn delete_place(&self, id: &PlaceId) -> ServiceResult<()> {
        self.execute(self.request(Method::DELETE, &format!("cards/{id}")))
            .await
            .map(|_| ())
            .map_err(|err| scope_to_place(err, id))
    }

    async fn like_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.fetch(self.request(Method::PUT, &format!("cards/likes/{id}")))
            .await
            .map_err(|err| scope_to_place(err, id))
    }

    async fn dislike_place(&self, id: &PlaceId) -> ServiceResult<PlaceRecord> {
        self.fetch(self.request(Method::DELETE, &format!("cards/likes/{id}")))
            .await
            .map_err(|err| scope_to_place(err, id))
    }
}

fn api_root(config: &ApiConfig) -> String {
    format!(
        "{}/{}",
        config.base_url.as_str().trim_end_matches('/'),
        config.group.trim_matches('/')
    )
}

fn map_transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        return ServiceError::Transport("request timed out".to_string());
    }
    ServiceError::Transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ServiceError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
    let message = message
        .chars()
        .take(MAX_ERROR_MESSAGE_CHARS)
        .collect::<String>();
    if status == StatusCode::BAD_REQUEST {
        return ServiceError::Rejected(message);
    }
    ServiceError::Status {
        status: status.as_u16(),
        message,
    }
}

fn scope_to_place(error: ServiceError, id: &PlaceId) -> ServiceError {
    match error {
        ServiceError::Status { status: 404, .. } => ServiceError::NotFound(id.clone()),
        ServiceError::Status { status: 403, .. } => ServiceError::Forbidden(id.clone()),
        other => other,
    }
}
