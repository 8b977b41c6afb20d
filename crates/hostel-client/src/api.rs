//! Uniform REST wrapper: attaches the bearer credential when present,
//! serializes/deserializes JSON, and treats any non-2xx response as a
//! failure carrying the response body as its message.
//!
//! No retry policy: callers re-invoke explicitly.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use hostel_types::api::{
    AuthResponse, CreateComplaintRequest, CreatePaymentRequest, CreateRenewalFormRequest,
    CreateRoomRequest, LoginRequest, MessageResponse, MyRoomResponse, RegisterRequest,
    RenewalReviewRequest, UpsertMessMenuRequest,
};
use hostel_types::models::{
    Complaint, ComplaintStatus, DocumentSlot, Identity, MessMenu, Payment, RenewalForm, Room,
};

use crate::error::{ClientError, Result};
use crate::session::Session;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for `base_url`, optionally carrying a bearer
    /// token. The whole-request timeout defaults to 30s and can be
    /// overridden with `HOSTEL_HTTP_TIMEOUT` (seconds).
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let timeout_secs = std::env::var("HOSTEL_HTTP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn with_session(base_url: impl Into<String>, session: &Session) -> Result<Self> {
        Self::new(base_url, Some(session.token.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a response: 2xx passes through, 401 becomes an auth failure,
    /// anything else surfaces the body text.
    pub(crate) async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Auth(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.authorize(self.http.get(self.url(path))).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .authorize(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .authorize(self.http.put(self.url(path)).json(body))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.authorize(self.http.put(self.url(path))).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .authorize(self.http.delete(self.url(path)))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    // ── Auth ────────────────────────────────────────────────────────────

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        self.post("/api/register", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        self.post("/api/login", req).await
    }

    // ── Rooms ───────────────────────────────────────────────────────────

    pub async fn rooms(&self) -> Result<Vec<Room>> {
        self.get("/api/rooms").await
    }

    pub async fn create_room(&self, req: &CreateRoomRequest) -> Result<MessageResponse> {
        self.post("/api/rooms", req).await
    }

    pub async fn assign_room(
        &self,
        room_number: &str,
        student_id: Uuid,
    ) -> Result<MessageResponse> {
        self.put_empty(&format!("/api/rooms/{room_number}/assign/{student_id}"))
            .await
    }

    pub async fn my_room(&self) -> Result<MyRoomResponse> {
        self.get("/api/my-room").await
    }

    // ── Complaints ──────────────────────────────────────────────────────

    pub async fn complaints(&self) -> Result<Vec<Complaint>> {
        self.get("/api/complaints").await
    }

    pub async fn create_complaint(&self, req: &CreateComplaintRequest) -> Result<MessageResponse> {
        self.post("/api/complaints", req).await
    }

    pub async fn set_complaint_status(
        &self,
        complaint_id: Uuid,
        status: ComplaintStatus,
    ) -> Result<MessageResponse> {
        self.put_empty(&format!("/api/complaints/{complaint_id}/status?status={status}"))
            .await
    }

    // ── Payments ────────────────────────────────────────────────────────

    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.get("/api/payments").await
    }

    pub async fn create_payment(&self, req: &CreatePaymentRequest) -> Result<MessageResponse> {
        self.post("/api/payments", req).await
    }

    pub async fn mark_payment_paid(&self, payment_id: Uuid) -> Result<MessageResponse> {
        self.put_empty(&format!("/api/payments/{payment_id}/mark-paid"))
            .await
    }

    // ── Mess menu ───────────────────────────────────────────────────────

    pub async fn mess_menu(&self) -> Result<Vec<MessMenu>> {
        self.get("/api/mess-menu").await
    }

    pub async fn upsert_mess_menu(&self, req: &UpsertMessMenuRequest) -> Result<MessageResponse> {
        self.post("/api/mess-menu", req).await
    }

    pub async fn delete_mess_menu(&self, menu_id: Uuid) -> Result<MessageResponse> {
        self.delete(&format!("/api/mess-menu/{menu_id}")).await
    }

    // ── Students ────────────────────────────────────────────────────────

    pub async fn students(&self) -> Result<Vec<Identity>> {
        self.get("/api/students").await
    }

    pub async fn delete_student(&self, student_id: Uuid) -> Result<MessageResponse> {
        self.delete(&format!("/api/students/{student_id}")).await
    }

    // ── Renewal forms ───────────────────────────────────────────────────

    pub async fn renewal_forms(&self) -> Result<Vec<RenewalForm>> {
        self.get("/api/renewal-forms").await
    }

    pub async fn renewal_form(&self, form_id: Uuid) -> Result<RenewalForm> {
        self.get(&format!("/api/renewal-forms/{form_id}")).await
    }

    pub async fn create_renewal_form(
        &self,
        files: BTreeMap<DocumentSlot, String>,
    ) -> Result<MessageResponse> {
        self.post("/api/renewal-forms", &CreateRenewalFormRequest { files })
            .await
    }

    /// Replace-merge the files mapping on a form. The backend applies
    /// last-write-wins per slot.
    pub async fn update_renewal_files(
        &self,
        form_id: Uuid,
        files: &BTreeMap<DocumentSlot, String>,
    ) -> Result<MessageResponse> {
        self.put(&format!("/api/renewal-forms/{form_id}/files"), files)
            .await
    }

    pub async fn review_renewal_form(
        &self,
        form_id: Uuid,
        req: &RenewalReviewRequest,
    ) -> Result<MessageResponse> {
        self.put(&format!("/api/renewal-forms/{form_id}"), req).await
    }

    // ── Files ───────────────────────────────────────────────────────────

    /// Stream a stored document to `dest`. A transfer that errors
    /// partway leaves no truncated file behind.
    pub async fn download_file(
        &self,
        student_id: Uuid,
        filename: &str,
        dest: &Path,
    ) -> Result<u64> {
        let response = self
            .authorize(
                self.http
                    .get(self.url(&format!("/api/download-file/{student_id}/{filename}"))),
            )
            .send()
            .await?;
        let response = Self::check(response).await?;

        match Self::stream_to_file(response, dest).await {
            Ok(written) => Ok(written),
            Err(err) => {
                let _ = tokio::fs::remove_file(dest).await;
                Err(err)
            }
        }
    }

    async fn stream_to_file(response: Response, dest: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}
