//! HTTP client for the NearByAid API.
//!
//! The credential is never held by the client itself: every call takes a
//! [`RequestContext`] describing who is calling.

use std::fmt;

use nearbyaid_shared::protocol::{
    AuthResponse, CreateAidRequest, CreateAidResponse, ErrorBody, HelpPointView, LoginRequest,
    NearbyResponse, RegisterRequest,
};
use nearbyaid_shared::GeoPoint;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Per-call credential.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    bearer: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
        }
    }

    /// Context for the account a login or registration just returned.
    pub fn from_auth(auth: &AuthResponse) -> Self {
        Self::bearer(auth.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer.is_some()
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AidClient {
    http: Client,
    base_url: String,
}

impl AidClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        let builder = self.http.post(self.url("/auth/register")).json(req);
        send(builder).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let builder = self.http.post(self.url("/auth/login")).json(req);
        send(builder).await
    }

    /// Publish a help point as the account in `ctx`.
    pub async fn create_aid(
        &self,
        ctx: &RequestContext,
        req: &CreateAidRequest,
    ) -> Result<HelpPointView> {
        let builder = self.http.post(self.url("/aid")).json(req);
        let created: CreateAidResponse = send(ctx.apply(builder)).await?;
        Ok(created.aid)
    }

    pub async fn nearby(
        &self,
        ctx: &RequestContext,
        center: &GeoPoint,
        max_distance_m: f64,
    ) -> Result<NearbyResponse> {
        let builder = self.http.get(self.url("/aid/nearby")).query(&[
            ("lat", center.lat),
            ("lng", center.lon),
            ("maxDistance", max_distance_m),
        ]);
        send(ctx.apply(builder)).await
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = builder.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Something went wrong")
                .to_string(),
        };
        warn!(status = status.as_u16(), %message, "API request failed");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    debug!(status = status.as_u16(), len = bytes.len(), "API response");
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
