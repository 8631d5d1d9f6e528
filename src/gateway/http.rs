//! # HTTP Gateway
//!
//! [`Gateway`] over the identity server's REST API.
//!
//! | Operation | Request | Success | Failure mapping |
//! |---|---|---|---|
//! | read-one | `GET /{collection}/{id}` | `{ <envelope>: record \| null }` | 404 → `None` |
//! | members | `GET /{collection}/{id}/{members}` | `{ <directory>: [] }` | any → `Transport` |
//! | read-all | `GET /{directory}` | `{ <directory>: [] }` | any → `Transport` |
//! | read-by-org | `GET /orgs/{org}/{directory}` | `{ <directory>: [] }` | any → `Transport` |
//! | update | `PUT /{collection}/{id}` + draft | `{ <envelope>: record }` | 400 → `ValidationRejected` |
//! | delete | `DELETE /{collection}/{id}` | 2xx | 409 → `Conflict` |
//!
//! Paths are relative to `base_url` + `api_prefix` from [`ConsoleConfig`].

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::framework::ResourceEntity;
use crate::gateway::{AssociationScope, Gateway, GatewayError};
use crate::runtime::ConsoleConfig;

/// REST addressing for a resource type.
pub trait RestResource: ResourceEntity + DeserializeOwned {
    /// Collection path segment, e.g. `roles`.
    const COLLECTION: &'static str;
    /// Key wrapping a single record in responses, e.g. `role`.
    const ENVELOPE: &'static str;
    /// Member sub-collection, e.g. `users` in `/roles/{id}/users`.
    const MEMBERS: &'static str;
    /// Directory collection of the associated type. Also the key wrapping every list response.
    const DIRECTORY: &'static str;
}

/// HTTP-backed gateway for one resource type.
pub struct HttpGateway<T> {
    /// `base_url` + `api_prefix`, no trailing slash.
    base: String,
    auth_token: Option<String>,
    client: Client,
    _resource: PhantomData<fn() -> T>,
}

impl<T: RestResource> HttpGateway<T> {
    /// Builds a gateway with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: &ConsoleConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let mut base = config.base_url.trim_end_matches('/').to_string();
        let prefix = config.api_prefix.trim_matches('/');
        if !prefix.is_empty() {
            base.push('/');
            base.push_str(prefix);
        }

        Ok(Self {
            base,
            auth_token: config.auth_token.clone(),
            client,
            _resource: PhantomData,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn record_path(id: T::Id) -> String {
        format!("/{}/{id}", T::COLLECTION)
    }

    fn list_path(scope: AssociationScope<T::Id>) -> String {
        match scope {
            AssociationScope::Members(id) => format!("/{}/{id}/{}", T::COLLECTION, T::MEMBERS),
            AssociationScope::All => format!("/{}", T::DIRECTORY),
            AssociationScope::Org(org) => format!("/orgs/{org}/{}", T::DIRECTORY),
        }
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, GatewayError> {
    builder
        .send()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))
}

async fn read_json(response: Response) -> Result<Value, GatewayError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| GatewayError::Transport(format!("invalid response body: {e}")))
}

/// Body text for error messages, falling back to the status line.
async fn failure_text(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => format!("status {status}"),
    }
}

/// Pulls `key` out of `{ key: ... }`. A missing or null key is `None`.
fn unwrap_envelope<R: DeserializeOwned>(body: Value, key: &str) -> Result<Option<R>, GatewayError> {
    let Value::Object(mut fields) = body else {
        return Err(GatewayError::Transport(format!(
            "expected an object wrapping `{key}`"
        )));
    };
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| GatewayError::Transport(format!("invalid `{key}` payload: {e}"))),
    }
}

#[async_trait]
impl<T> Gateway<T> for HttpGateway<T>
where
    T: RestResource,
    T::Draft: Serialize,
    T::Associated: DeserializeOwned,
{
    #[instrument(skip(self))]
    async fn read_one(&self, id: T::Id) -> Result<Option<T>, GatewayError> {
        let path = Self::record_path(id);
        debug!(%path, "GET");
        let response = send(self.request(Method::GET, &path)).await?;
        match response.status() {
            status if status.is_success() => unwrap_envelope(read_json(response).await?, T::ENVELOPE),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(GatewayError::Transport(format!("GET {path}: status {status}"))),
        }
    }

    #[instrument(skip(self))]
    async fn read_associated(
        &self,
        scope: AssociationScope<T::Id>,
    ) -> Result<Vec<T::Associated>, GatewayError> {
        let path = Self::list_path(scope);
        debug!(%path, "GET");
        let response = send(self.request(Method::GET, &path)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("GET {path}: status {status}")));
        }
        let entries = unwrap_envelope(read_json(response).await?, T::DIRECTORY)?;
        Ok(entries.unwrap_or_default())
    }

    #[instrument(skip(self, draft))]
    async fn update(&self, id: T::Id, draft: T::Draft) -> Result<T, GatewayError> {
        let path = Self::record_path(id);
        debug!(%path, ?draft, "PUT");
        let response = send(self.request(Method::PUT, &path).json(&draft)).await?;
        let status = response.status();
        match status {
            status if status.is_success() => unwrap_envelope(read_json(response).await?, T::ENVELOPE)?
                .ok_or_else(|| {
                    GatewayError::Transport(format!("PUT {path}: response has no `{}`", T::ENVELOPE))
                }),
            StatusCode::BAD_REQUEST => Err(GatewayError::ValidationRejected(
                failure_text(response).await,
            )),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(path)),
            _ => Err(GatewayError::Transport(format!(
                "PUT {path}: {}",
                failure_text(response).await
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), GatewayError> {
        let path = Self::record_path(id);
        debug!(%path, "DELETE");
        let response = send(self.request(Method::DELETE, &path)).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(GatewayError::Conflict(failure_text(response).await)),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(path)),
            _ => Err(GatewayError::Transport(format!(
                "DELETE {path}: {}",
                failure_text(response).await
            ))),
        }
    }
}
