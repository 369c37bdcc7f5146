//! Async HTTP client wrapping the turnstile JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use turnstile_core::{
  access_log::Stats,
  directory::BulkImport,
  log::LogEntry,
  person::{NewPerson, Person},
};
use uuid::Uuid;

/// Connection settings for the turnstile API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the turnstile JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .auth(self.client.get(self.url(path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = check(resp, "GET", path).await?;
    resp.json().await.with_context(|| format!("deserialising GET {path}"))
  }

  async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
    let resp = self
      .auth(self.client.post(self.url(path)))
      .json(body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    let resp = check(resp, "POST", path).await?;
    resp.json().await.with_context(|| format!("deserialising POST {path}"))
  }

  // ── People ────────────────────────────────────────────────────────────────

  /// `GET /api/people`
  pub async fn list_people(&self) -> Result<Vec<Person>> { self.get_json("/people").await }

  /// `POST /api/people`
  pub async fn add_person(&self, person: &NewPerson) -> Result<Person> {
    self.post_json("/people", person).await
  }

  /// `POST /api/people/{id}/toggle`
  pub async fn toggle_person(&self, id: Uuid) -> Result<Person> {
    let path = format!("/people/{id}/toggle");
    let resp = self
      .auth(self.client.post(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    let resp = check(resp, "POST", &path).await?;
    resp.json().await.context("deserialising toggled person")
  }

  /// `DELETE /api/people/{id}`
  pub async fn remove_person(&self, id: Uuid) -> Result<()> {
    let path = format!("/people/{id}");
    let resp = self
      .auth(self.client.delete(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;
    check(resp, "DELETE", &path).await?;
    Ok(())
  }

  /// `POST /api/people/import` with a raw CSV body.
  pub async fn import_people(&self, sheet: Vec<u8>) -> Result<BulkImport> {
    let resp = self
      .auth(self.client.post(self.url("/people/import")))
      .header(reqwest::header::CONTENT_TYPE, "text/csv")
      .body(sheet)
      .send()
      .await
      .context("POST /people/import failed")?;
    let resp = check(resp, "POST", "/people/import").await?;
    resp.json().await.context("deserialising import result")
  }

  // ── Check-in ──────────────────────────────────────────────────────────────

  /// `POST /api/scan`
  pub async fn scan(&self, code: &str) -> Result<LogEntry> {
    self.post_json("/scan", &serde_json::json!({ "code": code })).await
  }

  /// `GET /api/log?limit=<n>`
  pub async fn recent_log(&self, limit: usize) -> Result<Vec<LogEntry>> {
    self.get_json(&format!("/log?limit={limit}")).await
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<Stats> { self.get_json("/stats").await }

  // ── Export ────────────────────────────────────────────────────────────────

  /// Download one of the `/api/export*` or `/api/template.csv` documents as
  /// text.
  pub async fn download(&self, path: &str) -> Result<String> {
    let resp = self
      .auth(self.client.get(self.url(path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = check(resp, "GET", path).await?;
    resp.text().await.with_context(|| format!("reading GET {path}"))
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, method: &str, path: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v["error"].as_str().map(str::to_owned))
    .unwrap_or_else(|| status.to_string());
  Err(anyhow!("{method} {path} → {message}"))
}
