// src/app/api.rs
//! Blocking HTTP client for the Nevify backend.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::app::movie::{Movie, RawListing};
use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Backend-provided message, when the error body carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(m), ..
            } => Some(m.as_str()),
            _ => None,
        }
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Backend message when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }
}

pub const CONNECTION_ERROR: &str = "Erro de conexão com o servidor";

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: String,
}

/// Body of `POST /favorites`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FavoritePayload {
    pub id: i64,
    pub title: String,
    pub poster_path: String,
    pub vote_average: f64,
    pub release_date: Option<String>,
    pub overview: String,
}

impl From<&Movie> for FavoritePayload {
    fn from(m: &Movie) -> Self {
        Self {
            id: m.tmdb_id,
            title: m.title.clone(),
            poster_path: m.poster_path.clone(),
            vote_average: m.vote_average,
            release_date: m.release_date.clone(),
            overview: m.overview.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub birth: String,
    pub email: String,
    pub password: String,
}

pub struct ApiClient {
    base: String,
    http: Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(cfg: &AppConfig, token: Option<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("nevify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .default_headers({
                let mut h = HeaderMap::new();
                h.insert(ACCEPT, HeaderValue::from_static("application/json"));
                h
            })
            .build()?;
        Ok(Self {
            base: cfg.api_base_url.trim_end_matches('/').to_string(),
            http,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.header(AUTHORIZATION, format!("Bearer {t}")),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .text()
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|b| b.message);
        debug!("backend answered {status}: {message:?}");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn get_listing(&self, path: &str) -> Result<RawListing, ApiError> {
        let resp = self.send(self.authed(self.http.get(self.url(path))))?;
        let body = resp.text()?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ---- catalog ----

    /// `GET /movies/{kind}?page=N` for popular/toprated/nowplaying/upcoming.
    pub fn list_movies(&self, kind: &str, page: u32) -> Result<RawListing, ApiError> {
        self.get_listing(&format!("/movies/{kind}?page={page}"))
    }

    pub fn search_movies(&self, query: &str, page: u32) -> Result<RawListing, ApiError> {
        self.get_listing(&format!(
            "/movies/search?q={}&page={page}",
            urlencoding::encode(query)
        ))
    }

    // ---- favorites ----

    pub fn favorites(&self) -> Result<RawListing, ApiError> {
        self.get_listing("/favorites")
    }

    pub fn add_favorite(&self, payload: &FavoritePayload) -> Result<(), ApiError> {
        self.send(self.authed(self.http.post(self.url("/favorites")).json(payload)))?;
        Ok(())
    }

    pub fn remove_favorite(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.authed(self.http.delete(self.url(&format!("/favorites/{id}")))))?;
        Ok(())
    }

    // ---- account ----

    pub fn change_username(&self, username: &str) -> Result<(), ApiError> {
        let body = json!({ "username": username });
        self.send(self.authed(self.http.patch(self.url("/user/username")).json(&body)))?;
        Ok(())
    }

    pub fn change_password(&self, password: &str) -> Result<(), ApiError> {
        let body = json!({ "password": password });
        self.send(self.authed(self.http.patch(self.url("/user/password")).json(&body)))?;
        Ok(())
    }

    pub fn clear_favorites(&self) -> Result<(), ApiError> {
        self.send(self.authed(self.http.delete(self.url("/user/favorites"))))?;
        Ok(())
    }

    pub fn delete_account(&self) -> Result<(), ApiError> {
        self.send(self.authed(self.http.delete(self.url("/user"))))?;
        Ok(())
    }

    // ---- auth (no bearer) ----

    pub fn register(&self, reg: &Registration) -> Result<(), ApiError> {
        self.send(self.http.post(self.url("/register")).json(reg))?;
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let body = json!({ "username": username, "password": password });
        let resp = self.send(self.http.post(self.url("/login")).json(&body))?;
        let text = resp.text()?;
        let parsed: LoginBody =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(parsed.token)
    }
}
