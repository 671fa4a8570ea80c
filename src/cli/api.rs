use std::{env, fmt, fs, path::PathBuf};

use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{Allocations, Category, CategoryUpdate, Profile, Rule, User, UserUpdate};

/// Uniform failure shape. Every way a call can go wrong -- connection
/// refused, 4xx, 5xx, bad body -- collapses into this before the views
/// ever see it.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    token_file: PathBuf,
}

impl Client {
    /// Base URL from `API_URL`, bearer token from the token file when one
    /// was saved by a previous login (the localStorage stand-in).
    pub fn from_env() -> Self {
        let base_url =
            env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000/api".to_string());
        let token_file =
            PathBuf::from(env::var("TOKEN_FILE").unwrap_or_else(|_| ".budget_token".to_string()));
        let token = fs::read_to_string(&token_file)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
            token_file,
        }
    }

    /// Programmatic constructor; token persistence goes to a scratch file
    /// so it never clobbers a real session.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let token_file =
            env::temp_dir().join(format!(".budget_token-{}", std::process::id()));
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
            token_file,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> ApiResult<T> {
        let response = Self::check(req).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| ApiError {
            message: e.to_string(),
            status: Some(status),
            data: None,
        })
    }

    async fn send_unit(req: RequestBuilder) -> ApiResult<()> {
        Self::check(req).await.map(|_| ())
    }

    async fn check(req: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = req.send().await.map_err(|e| ApiError {
            message: e.to_string(),
            status: None,
            data: None,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let data: Option<Value> = response.json().await.ok();
        let message = data
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        Err(ApiError {
            message,
            status: Some(status.as_u16()),
            data,
        })
    }

    // ============= Categories =============

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Self::send(self.request(Method::GET, "/categories")).await
    }

    pub async fn create_category(
        &self,
        name: &str,
        priority: u8,
        budget: Decimal,
    ) -> ApiResult<Category> {
        let body = json!({ "name": name, "priority": priority, "budget": budget });
        Self::send(self.request(Method::POST, "/categories").json(&body)).await
    }

    pub async fn update_category(&self, id: &str, patch: &CategoryUpdate) -> ApiResult<Category> {
        Self::send(
            self.request(Method::PUT, &format!("/categories/{id}"))
                .json(patch),
        )
        .await
    }

    pub async fn delete_category(&self, id: &str) -> ApiResult<()> {
        Self::send_unit(self.request(Method::DELETE, &format!("/categories/{id}"))).await
    }

    // ============= Rules =============

    pub async fn list_rules(&self) -> ApiResult<Vec<Rule>> {
        Self::send(self.request(Method::GET, "/rules")).await
    }

    pub async fn active_rule(&self) -> ApiResult<Rule> {
        Self::send(self.request(Method::GET, "/rules/active")).await
    }

    pub async fn activate_rule(&self, id: &str) -> ApiResult<Rule> {
        Self::send(self.request(Method::POST, &format!("/rules/{id}/activate"))).await
    }

    pub async fn customize_rule(&self, id: &str, allocations: Allocations) -> ApiResult<Rule> {
        let body = json!({ "allocations": allocations });
        Self::send(
            self.request(Method::PUT, &format!("/rules/{id}/customize"))
                .json(&body),
        )
        .await
    }

    // ============= Users =============

    pub async fn get_profile(&self) -> ApiResult<Profile> {
        Self::send(self.request(Method::GET, "/users/profile")).await
    }

    pub async fn update_profile(&self, patch: &UserUpdate) -> ApiResult<Profile> {
        Self::send(self.request(Method::PUT, "/users/profile").json(patch)).await
    }

    // ============= Auth =============

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> ApiResult<User> {
        let body = json!({ "username": username, "email": email, "password": password });
        let auth: AuthResponse =
            Self::send(self.request(Method::POST, "/auth/register").json(&body)).await?;
        self.store_token(auth.token);
        Ok(auth.user)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<User> {
        let body = json!({ "email": email, "password": password });
        let auth: AuthResponse =
            Self::send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        self.store_token(auth.token);
        Ok(auth.user)
    }

    pub fn logout(&mut self) {
        self.token = None;
        let _ = fs::remove_file(&self.token_file);
    }

    fn store_token(&mut self, token: String) {
        // Best effort: an unwritable token file only costs a re-login.
        let _ = fs::write(&self.token_file, &token);
        self.token = Some(token);
    }
}
