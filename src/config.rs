//! Runtime configuration for the Spotify client and the dashboard server.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Default Spotify accounts service (token endpoint lives under it).
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com/";

/// Default Spotify Web API root.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1/";

const ID_VARS: &[&str] = &["SPOTIFY_CLIENT_ID", "client_id"];
const SECRET_VARS: &[&str] = &["SPOTIFY_CLIENT_SECRET", "client_secret"];

/// Settings for talking to the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Application client id.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
    /// Country code passed as `market` to catalog endpoints.
    pub market: String,
    /// Base URL of the accounts service.
    pub accounts_url: String,
    /// Base URL of the Web API, including the version segment.
    pub api_url: String,
    /// Maximum number of batch requests in flight at once.
    pub max_in_flight: usize,
}

impl SpotifyConfig {
    /// Create a configuration with the given credentials and default endpoints.
    pub fn new<S1: Into<String>, S2: Into<String>>(client_id: S1, client_secret: S2) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            market: "US".to_string(),
            accounts_url: ACCOUNTS_BASE_URL.to_string(),
            api_url: API_BASE_URL.to_string(),
            max_in_flight: 4,
        }
    }

    /// Read credentials from the environment.
    ///
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` take precedence over the
    /// lowercase `client_id` / `client_secret` names.
    pub fn from_env() -> Result<Self> {
        Self::from_args_or_env(None, None)
    }

    /// Use the given credentials, reading any that are missing from the
    /// environment as [`SpotifyConfig::from_env`] does.
    pub fn from_args_or_env(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        Self::resolve(client_id, client_secret, |name| env::var(name).ok())
    }

    fn resolve<F>(client_id: Option<String>, client_secret: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = non_blank(client_id).or_else(|| first_var(&lookup, ID_VARS));
        let client_secret = non_blank(client_secret).or_else(|| first_var(&lookup, SECRET_VARS));

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(DashboardError::MissingCredentials),
        }
    }

    /// Set the market country code.
    pub fn with_market<S: Into<String>>(mut self, market: S) -> Self {
        self.market = market.into();
        self
    }

    /// Point the client at different accounts / API hosts.
    pub fn with_base_urls<S1: Into<String>, S2: Into<String>>(
        mut self,
        accounts_url: S1,
        api_url: S2,
    ) -> Self {
        self.accounts_url = ensure_trailing_slash(accounts_url.into());
        self.api_url = ensure_trailing_slash(api_url.into());
        self
    }

    /// Check that both credentials are present.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(DashboardError::MissingCredentials);
        }
        Ok(())
    }
}

/// Settings for the web dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
    /// Artist shown when the search box is empty.
    pub default_artist: String,
    /// Peer network sizes offered in the dropdown.
    pub peer_sizes: Vec<usize>,
    /// How often the page reloads itself.
    pub refresh_interval: Duration,
    /// Related acts requested per artist while growing the peer network.
    pub related_per_artist: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8050)),
            default_artist: "The Japanese House".to_string(),
            peer_sizes: vec![100, 200, 300],
            refresh_interval: Duration::from_secs(300),
            related_per_artist: 20,
        }
    }
}

impl DashboardConfig {
    /// Smallest offered peer network size, used when none is requested.
    pub fn default_peer_size(&self) -> usize {
        self.peer_sizes.first().copied().unwrap_or(100)
    }

    /// Snap a requested network size onto one of the offered sizes.
    pub fn peer_size_or_default(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if self.peer_sizes.contains(&n) => n,
            _ => self.default_peer_size(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_var<F: Fn(&str) -> Option<String>>(lookup: &F, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| non_blank(lookup(name)))
}

fn ensure_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_spotify_defaults() {
        let config = SpotifyConfig::new("id", "secret");
        assert_eq!(config.market, "US");
        assert_eq!(config.api_url, API_BASE_URL);
        assert_eq!(config.accounts_url, ACCOUNTS_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_urls_get_trailing_slash() {
        let config =
            SpotifyConfig::new("id", "secret").with_base_urls("http://127.0.0.1:9", "http://x/v1");
        assert_eq!(config.accounts_url, "http://127.0.0.1:9/");
        assert_eq!(config.api_url, "http://x/v1/");
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let config = SpotifyConfig::new("  ", "secret");
        assert!(matches!(
            config.validate(),
            Err(DashboardError::MissingCredentials)
        ));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_lowercase_credential_fallback() {
        let config =
            SpotifyConfig::resolve(None, None, vars(&[("client_id", "abc"), ("client_secret", "def")]))
                .unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "def");
    }

    #[test]
    fn test_credential_precedence() {
        let env = vars(&[
            ("SPOTIFY_CLIENT_ID", "upper-id"),
            ("client_id", "lower-id"),
            ("SPOTIFY_CLIENT_SECRET", ""),
            ("client_secret", "lower-secret"),
        ]);

        let config = SpotifyConfig::resolve(None, None, &env).unwrap();
        assert_eq!(config.client_id, "upper-id");
        assert_eq!(config.client_secret, "lower-secret");

        let config = SpotifyConfig::resolve(Some("flag-id".into()), Some(" ".into()), &env).unwrap();
        assert_eq!(config.client_id, "flag-id");
        assert_eq!(config.client_secret, "lower-secret");
    }

    #[test]
    fn test_missing_credentials() {
        let result = SpotifyConfig::resolve(Some("id".into()), None, vars(&[("client_id", "x")]));
        assert!(matches!(result, Err(DashboardError::MissingCredentials)));
    }

    #[test]
    fn test_peer_size_snapping() {
        let config = DashboardConfig::default();
        assert_eq!(config.peer_size_or_default(Some(200)), 200);
        assert_eq!(config.peer_size_or_default(Some(150)), 100);
        assert_eq!(config.peer_size_or_default(None), 100);
    }
}
