//! HTTP client for the Recurra REST API.
//!
//! One client implements all three remote collaborators of the settlement
//! engine: the bill service, the loan payment ledger and the savings goal
//! ledger. They share a base URL and a bearer token.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use recurra_core::bills::{BillServiceTrait, BillSummary, NewRecurringBill, RecurringBill};
use recurra_core::errors::{Error, Result};
use recurra_core::loans::{LoanPayment, LoanPaymentServiceTrait, NewLoanPayment};
use recurra_core::savings::{SavingsGoalServiceTrait, SavingsMovement};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default base URL for a locally running Recurra API.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-success response to [`Error::ServerRejected`], taking the
/// message from a JSON `message` or `error` field when the body has one.
pub fn rejection_from_body(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|err| err.message.or(err.error))
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty());
    if message.is_none() && !body.trim().is_empty() {
        debug!(
            "[RecurraApi] Unstructured error body ({}): {}",
            status,
            body.chars().take(200).collect::<String>()
        );
    }
    Error::ServerRejected {
        status: status.as_u16(),
        message,
    }
}

/// HTTP client for the Recurra REST API.
///
/// # Example
///
/// ```ignore
/// let client = RecurraApiClient::new("http://localhost:8080/api", "your-token")?;
/// let bills = client.get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RecurraApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
    timeout: Duration,
}

impl RecurraApiClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        Self::with_timeout(
            base_url,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or
    /// the HTTP client cannot be initialized.
    pub fn with_timeout(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| Error::Config(format!("Invalid access token format: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, operation: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                operation: operation.to_string(),
                after: self.timeout,
            }
        } else {
            Error::NetworkFailure(format!("{} failed: {}", operation, e))
        }
    }

    /// Send a request and return the raw response body of a 2xx answer.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String> {
        let url = self.url(path);
        let operation = format!("{} {}", method, path);
        debug!("[RecurraApi] {}", operation);

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.headers());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&operation, e))?;

        if !status.is_success() {
            return Err(rejection_from_body(status, &text));
        }
        Ok(text)
    }

    /// Send a request and parse the JSON response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<T> {
        let text = self.send(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Unexpected(format!(
                "Failed to parse response from {}: {} - {}",
                path,
                e,
                text.chars().take(200).collect::<String>()
            ))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(Method::GET, path, None).await
    }
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn json_body<T: Serialize>(body: &T) -> Result<Option<String>> {
    Ok(Some(serde_json::to_string(body)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bill service
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl BillServiceTrait for RecurraApiClient {
    async fn get_all(&self) -> Result<Vec<RecurringBill>> {
        let bills: Vec<RecurringBill> = self.get("/recurring-bills").await?;
        info!("[RecurraApi] Fetched {} recurring bills", bills.len());
        Ok(bills)
    }

    async fn get_summary(&self) -> Result<BillSummary> {
        self.get("/recurring-bills/summary").await
    }

    async fn create(&self, new_bill: NewRecurringBill) -> Result<RecurringBill> {
        self.fetch(Method::POST, "/recurring-bills", json_body(&new_bill)?)
            .await
    }

    async fn update(&self, bill: RecurringBill) -> Result<RecurringBill> {
        let path = format!("/recurring-bills/{}", segment(&bill.id));
        let body = json_body(&bill)?;
        self.fetch(Method::PUT, &path, body).await
    }

    async fn delete(&self, bill_id: &str) -> Result<()> {
        let path = format!("/recurring-bills/{}", segment(bill_id));
        self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn mark_paid(&self, bill_id: &str) -> Result<RecurringBill> {
        let path = format!("/recurring-bills/{}/mark-paid", segment(bill_id));
        self.fetch(Method::POST, &path, None).await
    }

    async fn unmark_paid(&self, bill_id: &str) -> Result<RecurringBill> {
        let path = format!("/recurring-bills/{}/unmark-paid", segment(bill_id));
        self.fetch(Method::POST, &path, None).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loan payment ledger
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LoanPaymentServiceTrait for RecurraApiClient {
    async fn get_by_loan(&self, loan_id: &str) -> Result<Vec<LoanPayment>> {
        self.get(&format!("/loans/{}/payments", segment(loan_id)))
            .await
    }

    async fn create(&self, payment: NewLoanPayment) -> Result<LoanPayment> {
        self.fetch(Method::POST, "/loan-payments", json_body(&payment)?)
            .await
    }

    async fn delete(&self, payment_id: &str) -> Result<()> {
        let path = format!("/loan-payments/{}", segment(payment_id));
        self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Savings goal ledger
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl SavingsGoalServiceTrait for RecurraApiClient {
    async fn add_deposit(&self, goal_id: &str, amount: Decimal) -> Result<()> {
        let path = format!("/savings-goals/{}/deposit", segment(goal_id));
        self.send(Method::POST, &path, json_body(&SavingsMovement { amount })?)
            .await?;
        Ok(())
    }

    async fn withdraw(&self, goal_id: &str, amount: Decimal) -> Result<()> {
        let path = format!("/savings-goals/{}/withdraw", segment(goal_id));
        self.send(Method::POST, &path, json_body(&SavingsMovement { amount })?)
            .await?;
        Ok(())
    }
}
