//! reqwest-backed gateway for the console REST API.
//!
//! The bearer token lives in a `SecretString` and is attached as a
//! sensitive header value, so neither our own tracing output nor reqwest's
//! debug formatting of the request ever shows it.

use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::error_from_body;
use super::{
    Invitation, InvitationResponse, IssueGateway, IssueListResponse, IssueUpdate, NewIssue,
    StatusChange, UserGateway, UserListResponse, UserUpdate,
};
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::query::params::{
    ExportFormat, QueryParams, export_params, issue_list_params, to_query_string,
    user_list_params,
};
use crate::query::{ExportFilter, IssueQuery, UserQuery};
use crate::types::{Issue, IssueId, IssueStatus, User, UserId};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpGateway {
    /// Build a gateway rooted at `base_url`.
    ///
    /// Endpoint paths are joined onto the base, so `https://host/api` and
    /// `https://host/api/` both resolve `issues` to `https://host/api/issues`.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DeskError::Config(format!(
                "api.base_url must be an http(s) URL, got '{base_url}'"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()).map(SecretString::from),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url(), config.token(), config.api_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        tracing::debug!(%method, %url, "api request");

        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| {
                    DeskError::Auth("token contains characters not allowed in a header".to_string())
                })?;
            value.set_sensitive(true);
            builder = builder.header(header::AUTHORIZATION, value);
        }
        Ok(builder)
    }

    fn request_with_params(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<RequestBuilder> {
        tracing::trace!(query = %to_query_string(params), "query parameters");
        Ok(self.request(method, path)?.query(params))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "api request did not complete");
            DeskError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = error_from_body(status, &body);
        tracing::warn!(status = status.as_u16(), error = %err, "api request failed");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }
}

impl IssueGateway for HttpGateway {
    async fn list_issues(&self, query: &IssueQuery) -> Result<IssueListResponse> {
        let params = issue_list_params(query);
        self.send_json(self.request_with_params(Method::GET, "issues", &params)?)
            .await
    }

    async fn get_issue(&self, id: IssueId) -> Result<Issue> {
        self.send_json(self.request(Method::GET, &format!("issues/{id}"))?)
            .await
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.send_json(self.request(Method::POST, "issues")?.json(issue))
            .await
    }

    async fn update_issue(&self, id: IssueId, update: &IssueUpdate) -> Result<Issue> {
        self.send_json(
            self.request(Method::PUT, &format!("issues/{id}"))?
                .json(update),
        )
        .await
    }

    async fn set_issue_status(&self, id: IssueId, status: IssueStatus) -> Result<Issue> {
        self.send_json(
            self.request(Method::PATCH, &format!("issues/{id}/status"))?
                .json(&StatusChange { status }),
        )
        .await
    }

    async fn delete_issue(&self, id: IssueId) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("issues/{id}"))?)
            .await
    }

    async fn export_issues(&self, format: ExportFormat, filter: &ExportFilter) -> Result<Vec<u8>> {
        let params = export_params(format, filter);
        let response = self
            .send(self.request_with_params(Method::GET, "issues/export", &params)?)
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl UserGateway for HttpGateway {
    async fn list_users(&self, query: &UserQuery) -> Result<UserListResponse> {
        let params = user_list_params(query);
        self.send_json(self.request_with_params(Method::GET, "users", &params)?)
            .await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.send_json(self.request(Method::GET, &format!("users/{id}"))?)
            .await
    }

    async fn invite_user(&self, invitation: &Invitation) -> Result<InvitationResponse> {
        self.send_json(self.request(Method::POST, "users/invite")?.json(invitation))
            .await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<()> {
        self.send_empty(
            self.request(Method::PUT, &format!("users/{id}"))?
                .json(update),
        )
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("users/{id}"))?)
            .await
    }
}
