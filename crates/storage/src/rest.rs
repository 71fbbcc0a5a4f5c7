use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::backend::{ObjectStore, TableStore};
use crate::error::{Result, StorageError};
use crate::query::Query;

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Client for a hosted Postgres-as-a-service project: PostgREST tables under
/// `/rest/v1` and object storage under `/storage/v1`.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("site-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let response = check(self.authorized(request).send().await?).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }
}

/// Query-string parameters PostgREST expects for `query`
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.select_param())];

    for filter in &query.filters {
        params.push((filter.column.clone(), format!("eq.{}", filter.value)));
    }

    if let Some(order) = &query.order {
        params.push((
            "order".to_string(),
            format!("{}.{}", order.column, order.direction.as_rest()),
        ));
    }

    params
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StorageError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TableStore for RestClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        debug!("GET {} {:?}", table, query);
        let request = self
            .client
            .get(self.table_url(table))
            .query(&query_params(query));
        self.rows(request).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        debug!("POST {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&row);

        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Backend {
                status: 201,
                message: "insert returned no representation".to_string(),
            })
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<u64> {
        debug!("PATCH {} id={}", table, id);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&id_filter(id))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&patch);

        Ok(self.rows(request).await?.len() as u64)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64> {
        debug!("DELETE {} id={}", table, id);
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&id_filter(id))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);

        Ok(self.rows(request).await?.len() as u64)
    }
}

#[async_trait]
impl ObjectStore for RestClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        debug!("uploading {} bytes to {}/{}", bytes.len(), bucket, path);
        let request = self
            .client
            .post(self.object_url(bucket, path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}
