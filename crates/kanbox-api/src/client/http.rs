//! `reqwest`-backed implementation of [`MailApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::MailApi;
use crate::error::{Error, Result};
use crate::model::{
    BoardQuery, ColumnDraft, ColumnId, EmailDetail, EmailId, EmailListQuery, EmailPage,
    EmailSummary, Envelope, ErrorEnvelope, FreezeRequest, FreezeResponse, KanbanBoard,
    KanbanColumn, Mailbox, ModifyEmailRequest, MoveColumnRequest, MoveColumnResponse,
};

/// HTTP client for the mail backend REST API.
#[derive(Debug, Clone)]
pub struct HttpMailApi {
    base_url: Url,
    access_token: Option<String>,
    http_client: Client,
}

impl HttpMailApi {
    /// Creates a client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "API base URL {base_url} cannot carry paths"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            access_token: None,
            http_client,
        })
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Resolves an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let builder = self.http_client.request(method, url);
        Ok(match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends a request and unwraps the `{success, message, data}` envelope.
    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Option<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode(status, body)
    }

    /// Like [`Self::send`] but requires a payload.
    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        Self::send(builder)
            .await?
            .ok_or_else(|| Error::Rejected("response carried no data".into()))
    }
}

/// Unwraps a response body. An empty 2xx body or a missing `data` field
/// is `Ok(None)`; a `data` field that does not match `T` is an error.
fn decode<T: DeserializeOwned>(status: StatusCode, body: String) -> Result<Option<T>> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or(body, |envelope| envelope.message);
        return Err(Error::status(status.as_u16(), message));
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    if !envelope.success {
        return Err(Error::Rejected(envelope.message));
    }
    Ok(envelope.data)
}

#[async_trait]
impl MailApi for HttpMailApi {
    async fn list_mailboxes(&self) -> Result<Vec<Mailbox>> {
        Self::fetch(self.request(Method::GET, "labels")?).await
    }

    async fn list_emails(&self, query: &EmailListQuery) -> Result<EmailPage> {
        let path = format!("labels/{}/emails", query.mailbox_id);
        Self::fetch(self.request(Method::GET, &path)?.query(&query.params())).await
    }

    async fn get_email(&self, id: &EmailId) -> Result<EmailDetail> {
        Self::fetch(self.request(Method::GET, &format!("emails/{id}"))?).await
    }

    async fn modify_email(
        &self,
        id: &EmailId,
        request: &ModifyEmailRequest,
    ) -> Result<Option<EmailSummary>> {
        let builder = self
            .request(Method::POST, &format!("emails/{id}/modify"))?
            .json(request);
        // Some backends answer with `{ success: true }` only.
        Self::send(builder).await
    }

    async fn get_board(&self, query: &BoardQuery) -> Result<KanbanBoard> {
        let builder = self
            .request(Method::GET, "kanban/board")?
            .query(&query.params());
        let mut board: KanbanBoard = Self::fetch(builder).await?;
        board.recount();
        Ok(board)
    }

    async fn move_to_column(&self, id: &EmailId, column: &ColumnId) -> Result<MoveColumnResponse> {
        let body = MoveColumnRequest {
            column_id: column.clone(),
        };
        let builder = self
            .request(Method::PATCH, &format!("{id}/kanban/column"))?
            .json(&body);
        Ok(Self::send(builder).await?.unwrap_or_default())
    }

    async fn freeze(&self, id: &EmailId, request: &FreezeRequest) -> Result<FreezeResponse> {
        let builder = self
            .request(Method::POST, &format!("{id}/freeze"))?
            .json(request);
        Ok(Self::send(builder).await?.unwrap_or_default())
    }

    async fn unfreeze(&self, id: &EmailId) -> Result<()> {
        let builder = self.request(Method::POST, &format!("{id}/unfreeze"))?;
        Self::send::<serde_json::Value>(builder).await?;
        Ok(())
    }

    async fn create_column(&self, draft: &ColumnDraft) -> Result<KanbanColumn> {
        Self::fetch(self.request(Method::POST, "kanban/columns")?.json(draft)).await
    }

    async fn update_column(&self, id: &ColumnId, draft: &ColumnDraft) -> Result<KanbanColumn> {
        let builder = self
            .request(Method::PUT, &format!("kanban/columns/{id}"))?
            .json(draft);
        Self::fetch(builder).await
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("kanban/columns/{id}"))?;
        Self::send::<serde_json::Value>(builder).await?;
        Ok(())
    }
}
