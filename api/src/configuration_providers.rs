//! Defines the trait and the HTTP implementation for the admin server's
//! `/configurations` endpoints.

use crate::mapping::Mapping;
use crate::mapping::MappingId;
use crate::ApiError;

/// A source of mapping configurations.
///
/// Both calls answer with the complete, current list of mappings so callers
/// can rebuild their state from either one.
pub trait ConfigurationProvider {
    /// Fetches every mapping the server knows about.
    async fn fetch_mappings(&self) -> Result<Vec<Mapping>, ApiError>;

    /// Sets the `active` flag of one mapping and returns the refreshed list.
    async fn set_mapping_active(
        &self,
        id: &MappingId,
        active: bool,
    ) -> Result<Vec<Mapping>, ApiError>;
}

/// Talks to a live admin server over HTTP.
pub mod http {
    use super::*;
    use crate::settings::ClientSettings;
    use reqwest::Method;
    use reqwest::Url;
    use tracing::debug;

    const CONFIGURATIONS: &str = "configurations";

    /// An implementation of the `ConfigurationProvider` trait backed by
    /// `reqwest`.
    ///
    /// - `GET  {base}/configurations`
    /// - `PUT  {base}/configurations/{mappingID}?active={status}`
    #[derive(Clone, Debug)]
    pub struct HttpConfigurations {
        client: reqwest::Client,
        base: Url,
    }

    impl HttpConfigurations {
        pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
            let base = Url::parse(&settings.base_url)
                .ok()
                .filter(|url| !url.cannot_be_a_base())
                .ok_or_else(|| ApiError::InvalidBaseUrl(settings.base_url.clone()))?;

            let client = reqwest::Client::builder()
                .timeout(settings.timeout)
                .build()
                .map_err(|source| ApiError::Transport {
                    url: base.to_string(),
                    source,
                })?;

            Ok(Self { client, base })
        }

        pub fn base_url(&self) -> &Url {
            &self.base
        }

        /// Appends `segments` to the base path, percent-encoding each one.
        fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
            let mut url = self.base.clone();
            {
                let mut path = url
                    .path_segments_mut()
                    .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?;
                path.pop_if_empty().extend(segments);
            }
            Ok(url)
        }

        async fn request(&self, method: Method, url: Url) -> Result<Vec<Mapping>, ApiError> {
            debug!(%method, %url, "sending configurations request");

            let response = self
                .client
                .request(method.clone(), url.clone())
                .send()
                .await
                .map_err(|source| ApiError::Transport {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Status {
                    method,
                    url: url.to_string(),
                    status,
                });
            }

            let body = response.text().await.map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

            let mappings: Vec<Mapping> =
                serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                    url: url.to_string(),
                    source,
                })?;

            debug!(%url, count = mappings.len(), "received mappings");
            Ok(mappings)
        }
    }

    impl ConfigurationProvider for HttpConfigurations {
        async fn fetch_mappings(&self) -> Result<Vec<Mapping>, ApiError> {
            let url = self.endpoint(&[CONFIGURATIONS])?;
            self.request(Method::GET, url).await
        }

        async fn set_mapping_active(
            &self,
            id: &MappingId,
            active: bool,
        ) -> Result<Vec<Mapping>, ApiError> {
            let id = id.to_string();
            let mut url = self.endpoint(&[CONFIGURATIONS, &id])?;
            url.query_pairs_mut()
                .append_pair("active", if active { "true" } else { "false" });
            self.request(Method::PUT, url).await
        }
    }

}
