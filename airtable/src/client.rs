//! Record store client implementation

use crate::{
    error::AirtableError,
    query::ListQuery,
    types::{
        ErrorEnvelope, FieldsPatch, ListResponse, NewRecord, Record, RecordFields, RecordUpdate,
        RecordsRequest, RecordsResponse,
    },
};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Client for one table of the record store
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    token: String,
    endpoint: Url,
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl AirtableClient {
    /// Create a client for the table at `endpoint` (`{api}/{base}/{table}`)
    #[must_use]
    pub fn new(endpoint: Url, token: String) -> Self {
        Self {
            client: Client::new(),
            token,
            endpoint,
        }
    }

    /// Create a client from the API root, base id and table name
    ///
    /// Base and table are appended as percent-encoded path segments.
    ///
    /// # Errors
    ///
    /// Returns [`AirtableError::InvalidEndpoint`] if `api_url` is not an
    /// absolute http(s) URL.
    pub fn from_parts(
        api_url: &str,
        base_id: &str,
        table_name: &str,
        token: &str,
    ) -> Result<Self, AirtableError> {
        let mut endpoint = Url::parse(api_url)
            .map_err(|e| AirtableError::InvalidEndpoint(format!("{api_url}: {e}")))?;
        endpoint
            .path_segments_mut()
            .map_err(|()| AirtableError::InvalidEndpoint(api_url.to_string()))?
            .pop_if_empty()
            .push(base_id)
            .push(table_name);

        Ok(Self::new(endpoint, token.to_string()))
    }

    /// The table endpoint requests are sent to
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// List every record matching `query`, following `offset` pages
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx responses, or bodies
    /// that do not match the list schema.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AirtableError> {
        let params = query.params();
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.endpoint.clone())
                .bearer_auth(&self.token)
                .query(&params);
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AirtableError::RequestFailed(e.to_string()))?;
            let page: ListResponse = decode(check(response).await?).await?;

            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    /// Create one record with `title` and `isCompleted: false`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx responses, or a response
    /// without the created record.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn create(&self, title: &str) -> Result<Record, AirtableError> {
        let body = RecordsRequest {
            records: vec![NewRecord {
                fields: RecordFields {
                    title: Some(title.to_string()),
                    is_completed: Some(false),
                },
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AirtableError::RequestFailed(e.to_string()))?;

        first_record(decode(check(response).await?).await?)
    }

    /// Apply a partial field update to record `id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-2xx responses, or a response
    /// without the updated record.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn update(&self, id: &str, fields: FieldsPatch) -> Result<Record, AirtableError> {
        let body = RecordsRequest {
            records: vec![RecordUpdate {
                id: id.to_string(),
                fields,
            }],
        };

        let response = self
            .client
            .patch(self.record_url(id)?)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AirtableError::RequestFailed(e.to_string()))?;

        first_record(decode(check(response).await?).await?)
    }

    /// Delete record `id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or non-2xx responses.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn delete(&self, id: &str) -> Result<(), AirtableError> {
        let response = self
            .client
            .delete(self.record_url(id)?)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AirtableError::RequestFailed(e.to_string()))?;

        check(response).await?;
        Ok(())
    }

    /// `{endpoint}/{id}`
    fn record_url(&self, id: &str) -> Result<Url, AirtableError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| AirtableError::InvalidEndpoint(self.endpoint.to_string()))?
            .push(id);
        Ok(url)
    }
}

/// Map non-2xx responses onto the error taxonomy
async fn check(response: Response) -> Result<Response, AirtableError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        },
        |envelope| envelope.error.into_message(),
    );
    tracing::warn!(status = status.as_u16(), %message, "Record store rejected request");

    Err(match status {
        StatusCode::UNAUTHORIZED => AirtableError::Unauthorized,
        StatusCode::NOT_FOUND => AirtableError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => AirtableError::RateLimited,
        status => AirtableError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Decode a successful body, reporting shape mismatches as malformed
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AirtableError> {
    let body = response
        .text()
        .await
        .map_err(|e| AirtableError::RequestFailed(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| AirtableError::MalformedResponse(e.to_string()))
}

fn first_record(response: RecordsResponse) -> Result<Record, AirtableError> {
    response
        .into_first()
        .ok_or_else(|| AirtableError::MalformedResponse("response contained no records".into()))
}
