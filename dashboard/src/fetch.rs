use anyhow::Context;
use firmscore::feature::FeatureCollection;
use firmscore::prelude::{DashboardError, FetchError};
use firmscore::source::{parse_feature_collection, parse_layer_names, LayerRequest, SourceConfig};
use log::debug;
use reqwest::{Client, Url};
use std::time::Duration;

/// Asynchronous client for the configured layer source.
///
/// Methods take `self` by value so their futures are `'static` and can be handed to
/// `Task::perform`; cloning is cheap.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: SourceConfig,
}

impl HttpSource {
    pub fn new(config: SourceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, config })
    }

    pub async fn layer_names(self) -> Result<Vec<String>, FetchError> {
        if let Some(layers) = self.config.static_layers() {
            return Ok(layers);
        }
        let url = match self.config.layers_url() {
            Ok(Some(url)) => url,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => return Err(FetchError::Transport(err.to_string())),
        };
        let body = self.get_text(url).await?;
        parse_layer_names(&body)
    }

    pub async fn fetch(self, request: LayerRequest) -> Result<FeatureCollection, DashboardError> {
        let url = self.config.request_url(&request)?;
        let body = self.get_text(url).await?;
        Ok(parse_feature_collection(&body)?)
    }

    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
