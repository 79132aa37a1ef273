use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

/// Configuration for [`ElasticStore`].
#[derive(Clone, Debug)]
pub struct ElasticConfig {
    /// Base URL of the cluster, e.g. "http://localhost:9200".
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Elasticsearch implementation of [`DocumentStore`] over the HTTP API.
/// OpenSearch answers the same three endpoints, so it works there too.
#[derive(Clone)]
pub struct ElasticStore {
    client: Client,
    config: ElasticConfig,
}

impl ElasticStore {
    pub fn new(config: ElasticConfig) -> Self {
        ElasticStore {
            client: Client::new(),
            config,
        }
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), index)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.user {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct CreateIndexResponse {
    #[serde(default)]
    acknowledged: bool,
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let resp = self
            .authorize(self.client.head(self.index_url(index)))
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(format!("index existence check failed with status {}", status).into()),
        }
    }

    async fn create_index(&self, index: &str) -> Result<bool, StoreError> {
        let resp = self
            .authorize(self.client.put(self.index_url(index)))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("index creation failed with status {}: {}", status, text).into());
        }

        let ack: CreateIndexResponse = resp.json().await?;
        Ok(ack.acknowledged)
    }

    async fn index_document(
        &self,
        index: &str,
        doc_type: &str,
        body: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.index_url(index), doc_type);
        let resp = self.authorize(self.client.post(&url)).json(body).send().await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("document indexing failed with status {}: {}", status, text).into())
        }
    }
}
