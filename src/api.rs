// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    AdminUser, Credentials, CrossoverSeries, Investment, MomentumSeries, NewInvestment, NewUser,
    Registration, SeedReport, SellOrder, StocksResponse, SymbolsResponse, TokenResponse,
};
use crate::session::Session;
use crate::utils::http_client;
use reqwest::Url;
use reqwest::blocking::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: Body::Empty,
            bearer: None,
        }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    pub fn path(&self) -> String {
        let mut out = String::from("/");
        for seg in &self.segments {
            out.push_str(seg);
            out.push('/');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Non-2xx statuses are responses, not errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| anyhow::anyhow!("Invalid API URL '{}': {}", config.api_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL '{}'", config.api_url);
        }
        Ok(Self {
            client: http_client(config.timeout)?,
            base_url,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Network("API URL cannot carry a path".into()))?;
            path.pop_if_empty();
            path.extend(request.segments.iter());
            path.push("");
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(request)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(parts) => builder.multipart(build_form(parts)?),
        };
        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(ApiResponse { status, body })
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                filename,
                mime,
                bytes,
            } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(filename.clone())
                    .mime_str(mime)?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

pub fn authorize(mut request: ApiRequest, session: &Session) -> ApiRequest {
    request.bearer = session.token();
    request
}

// A 401 clears the session once and is still returned to the caller.
pub fn intercept_unauthorized(
    result: Result<ApiResponse, ApiError>,
    session: &Session,
) -> Result<ApiResponse, ApiError> {
    match result {
        Ok(resp) if resp.status == 401 => {
            session.expire();
            Err(ApiError::Unauthorized)
        }
        Err(ApiError::Unauthorized) => {
            session.expire();
            Err(ApiError::Unauthorized)
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = authorize(request, &self.session);
        let path = request.path();
        let result = intercept_unauthorized(self.transport.send(&request), &self.session);
        match &result {
            Ok(resp) => debug!(method = ?request.method, %path, status = resp.status, "api call"),
            Err(err) => debug!(method = ?request.method, %path, error = %err, "api call failed"),
        }
        let resp = result?;
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(ApiError::from_status(resp.status, &resp.body))
        }
    }

    fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let resp = self.execute(request)?;
        Ok(serde_json::from_str(&resp.body)?)
    }

    pub fn login(&self, credentials: &Credentials, admin: bool) -> Result<TokenResponse, ApiError> {
        let segments: &[&str] = if admin {
            &["api", "admin", "login"]
        } else {
            &["api", "login"]
        };
        self.fetch(ApiRequest::new(Method::Post, segments).json(credentials)?)
    }

    pub fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.execute(ApiRequest::new(Method::Post, &["api", "register"]).json(registration)?)?;
        Ok(())
    }

    pub fn symbols(&self) -> Result<Vec<String>, ApiError> {
        let resp: SymbolsResponse =
            self.fetch(ApiRequest::new(Method::Get, &["stock_scraper", "symbols"]))?;
        Ok(resp.symbols)
    }

    pub fn stocks(&self) -> Result<StocksResponse, ApiError> {
        self.fetch(ApiRequest::new(Method::Get, &["stock_scraper", "stocks"]))
    }

    pub fn momentum(&self, symbol: &str) -> Result<MomentumSeries, ApiError> {
        self.fetch(ApiRequest::new(
            Method::Get,
            &["stock_scraper", "strategy", symbol],
        ))
    }

    pub fn crossover(&self, symbol: &str) -> Result<CrossoverSeries, ApiError> {
        self.fetch(ApiRequest::new(
            Method::Get,
            &["stock_scraper", "ma_crossover", symbol],
        ))
    }

    pub fn investments(&self) -> Result<Vec<Investment>, ApiError> {
        self.fetch(ApiRequest::new(Method::Get, &["stock_scraper", "investments"]))
    }

    pub fn add_investment(&self, investment: &NewInvestment) -> Result<Investment, ApiError> {
        self.fetch(
            ApiRequest::new(Method::Post, &["stock_scraper", "investments", "add"])
                .json(investment)?,
        )
    }

    pub fn sell_investment(&self, id: i64, order: &SellOrder) -> Result<Investment, ApiError> {
        let id = id.to_string();
        self.fetch(
            ApiRequest::new(Method::Patch, &["stock_scraper", "investments", &id]).json(order)?,
        )
    }

    pub fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.fetch(ApiRequest::new(Method::Get, &["api", "admin", "users"]))
    }

    pub fn admin_create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.execute(
            ApiRequest::new(Method::Post, &["api", "admin", "users", "create"]).json(user)?,
        )?;
        Ok(())
    }

    pub fn admin_delete_user(&self, id: i64) -> Result<(), ApiError> {
        let id = id.to_string();
        self.execute(ApiRequest::new(
            Method::Delete,
            &["api", "admin", "users", &id],
        ))?;
        Ok(())
    }

    pub fn admin_seed_stocks(
        &self,
        stock_title: &str,
        filename: &str,
        csv_bytes: Vec<u8>,
    ) -> Result<SeedReport, ApiError> {
        let parts = vec![
            FormPart::Text {
                name: "stock_title".into(),
                value: stock_title.to_string(),
            },
            FormPart::File {
                name: "csv_file".into(),
                filename: filename.to_string(),
                mime: "text/csv".into(),
                bytes: csv_bytes,
            },
        ];
        self.fetch(
            ApiRequest::new(Method::Post, &["api", "admin", "seed-stocks"]).multipart(parts),
        )
    }
}
