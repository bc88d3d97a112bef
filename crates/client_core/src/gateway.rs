use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{EventPage, PageNumber, UserProfile, Username},
    error::ApiError,
    protocol::{EventPageResponse, StatsResponse, UserSummaryResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::Settings, error::GatewayError};

/// Read-only access to the activity backend. Each call resolves or fails
/// exactly once; retry policy belongs to the caller.
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    async fn fetch_user_summary(&self, username: &Username) -> Result<UserProfile, GatewayError>;
    async fn fetch_event_page(
        &self,
        username: &Username,
        page: PageNumber,
    ) -> Result<EventPage, GatewayError>;
}

pub struct HttpGateway {
    http: Client,
    base_url: Url,
    profile_base_url: String,
}

impl HttpGateway {
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(&settings.api_base_url).map_err(|err| GatewayError::InvalidUrl {
                url: settings.api_base_url.clone(),
                reason: err.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl {
                url: settings.api_base_url.clone(),
                reason: "url cannot carry path segments".to_string(),
            });
        }
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| GatewayError::Setup(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            profile_base_url: settings.profile_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_stats(&self) -> Result<StatsResponse, GatewayError> {
        let url = self.endpoint(&["stats"])?;
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn profile_url(&self, username: &Username) -> String {
        if self.profile_base_url.ends_with('/') {
            format!("{}{}", self.profile_base_url, username)
        } else {
            format!("{}/{}", self.profile_base_url, username)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        debug!(%url, "gateway request");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| GatewayError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "gateway request rejected");
            return Err(GatewayError::Server(ApiError::new(status.as_u16(), body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl ActivityGateway for HttpGateway {
    async fn fetch_user_summary(&self, username: &Username) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["user", username.as_str()])?;
        let summary: UserSummaryResponse = self.get_json(url).await?;
        Ok(UserProfile {
            profile_url: self.profile_url(&summary.username),
            username: summary.username,
            event_count: summary.event_count,
            repos: summary.repos,
        })
    }

    async fn fetch_event_page(
        &self,
        username: &Username,
        page: PageNumber,
    ) -> Result<EventPage, GatewayError> {
        let page_segment = page.to_string();
        let url = self.endpoint(&["user", username.as_str(), "events", &page_segment])?;
        let body: EventPageResponse = self.get_json(url).await?;
        Ok(EventPage {
            page_number: page,
            events: body.events,
        })
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
