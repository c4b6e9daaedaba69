//! HTTP access to the Sleeper API

use reqwest::Client;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::FetchError;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport used for every outbound request
#[async_trait::async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue a GET. Only failures to obtain any response are errors;
    /// non-200 statuses come back as a normal `HttpResponse`.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the configured timeout and user agent
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::transport(config.base_url.clone(), e))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ApiTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!("GET {}", url);

        let response =
            self.client.get(url).send().await.map_err(|e| FetchError::transport(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FetchError::transport(url, e))?;

        Ok(HttpResponse { status, body })
    }
}

/// URL builder for the three Sleeper endpoints
#[derive(Debug, Clone)]
pub struct SleeperEndpoints {
    roster_url: String,
    base_url: String,
}

impl SleeperEndpoints {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            roster_url: config.roster_url.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn roster(&self) -> &str {
        &self.roster_url
    }

    /// Weekly regular-season stats for one player
    pub fn stats(&self, player_id: &str, season: u32) -> String {
        self.player_series("stats", player_id, season)
    }

    /// Weekly regular-season projections for one player
    pub fn projections(&self, player_id: &str, season: u32) -> String {
        self.player_series("projections", player_id, season)
    }

    fn player_series(&self, kind: &str, player_id: &str, season: u32) -> String {
        format!(
            "{}/{kind}/nfl/player/{player_id}?season_type=regular&season={season}&grouping=week",
            self.base_url
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_series_urls() {
        let config = ApiConfig { base_url: "https://api.sleeper.com/".to_string(), ..Default::default() };
        let endpoints = SleeperEndpoints::new(&config);

        assert_eq!(
            endpoints.stats("4046", 2023),
            "https://api.sleeper.com/stats/nfl/player/4046?season_type=regular&season=2023&grouping=week"
        );
        assert_eq!(
            endpoints.projections("KC", 2024),
            "https://api.sleeper.com/projections/nfl/player/KC?season_type=regular&season=2024&grouping=week"
        );
        assert_eq!(endpoints.roster(), "https://api.sleeper.app/v1/players/nfl");
    }

    #[tokio::test]
    async fn test_mock_transport_defaults_to_404() {
        let transport = mock::MockTransport::new();
        transport.respond("https://a", 200, "{}");

        assert_eq!(transport.get("https://a").await.unwrap(), HttpResponse::ok("{}"));
        assert_eq!(transport.get("https://b").await.unwrap().status, 404);
        assert_eq!(transport.calls(), vec!["https://a".to_string(), "https://b".to_string()]);
    }
}
