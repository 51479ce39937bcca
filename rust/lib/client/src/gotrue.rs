//! GoTrue auth endpoints (`{project}/auth/v1`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::Project;

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl User {
    /// `full_name` from the signup metadata, if any.
    pub fn metadata_full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub expires_in: i64,
    /// Absolute expiry (seconds since epoch). Filled in from `expires_in` when absent.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: User,
}

impl Session {
    /// Expiry timestamp, computing it from `expires_in` if the server left it out.
    pub fn expiry(&self, issued_at: i64) -> i64 {
        self.expires_at.unwrap_or(issued_at + self.expires_in)
    }

    /// Whether the access token is still usable at `now`, with `margin` seconds to spare.
    pub fn is_fresh(&self, now: i64, margin: i64) -> bool {
        match self.expires_at {
            Some(at) => now < at - margin,
            None => true,
        }
    }

    fn stamp(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(chrono::Utc::now().timestamp() + self.expires_in);
        }
        self
    }
}

/// Result of a signup: a session when email confirmation is off, a bare user otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUp {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[derive(Debug, Default, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(project: &Project) -> Self {
        Self::with_http(reqwest::Client::new(), project)
    }

    pub fn with_http(http: reqwest::Client, project: &Project) -> Self {
        Self {
            http,
            auth_url: format!("{}/auth/v1", project.url),
            api_key: project.anon_key.clone(),
        }
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{}", self.auth_url, path))
            .header("apikey", &self.api_key)
    }

    /// Register a new account. `metadata` lands in `user_metadata`.
    pub async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<SignUp, ApiError> {
        let resp = self
            .post("signup")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;
        let body: Value = parse(resp).await?;

        if body.get("access_token").is_some() {
            let session: Session = decode(body, "signup session")?;
            let session = session.stamp();
            return Ok(SignUp {
                user: Some(session.user.clone()),
                session: Some(session),
            });
        }
        let user = match body.get("user") {
            Some(u) => decode::<User>(u.clone(), "signup user")?,
            None => decode::<User>(body, "signup user")?,
        };
        Ok(SignUp {
            user: Some(user),
            session: None,
        })
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let resp = self
            .post("token?grant_type=password")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: Session = parse(resp).await?;
        Ok(session.stamp())
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let resp = self
            .post("token?grant_type=refresh_token")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let session: Session = parse(resp).await?;
        Ok(session.stamp())
    }

    /// Revoke the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let resp = self.post("logout").bearer_auth(access_token).send().await?;
        check(resp).await
    }

    pub async fn get_user(&self, access_token: &str) -> Result<User, ApiError> {
        let resp = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn update_user(&self, access_token: &str, attrs: &UserAttributes) -> Result<User, ApiError> {
        let resp = self
            .http
            .put(format!("{}/user", self.auth_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(attrs)
            .send()
            .await?;
        parse(resp).await
    }
}

async fn check(resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status.as_u16(), &body));
    }
    Ok(())
}

async fn parse<R: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status.as_u16(), &body));
    }
    resp.json::<R>()
        .await
        .map_err(|e| ApiError::Decode(format!("auth response: {}", e)))
}

fn decode<R: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{}: {}", what, e)))
}
