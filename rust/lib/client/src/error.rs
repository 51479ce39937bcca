use serde::Deserialize;

/// PostgREST error code for "zero rows where exactly one was requested".
pub const NO_ROWS: &str = "PGRST116";

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server {
        status: u16,
        /// Backend error code (`PGRST116`, `invalid_credentials`, ...), when the body carried one.
        code: Option<String>,
        message: String,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// A single-row lookup that matched nothing.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, ApiError::Server { status: 406, code: Some(code), .. } if code == NO_ROWS)
    }

    /// Build a `Server` error from a non-success status and its raw body.
    ///
    /// PostgREST answers `{"code", "message"}`, GoTrue answers
    /// `{"error_code", "msg"}` or `{"error", "error_description"}`;
    /// anything else is kept verbatim as the message.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ApiError::Server {
                status,
                code: parsed
                    .code
                    .as_ref()
                    .and_then(|c| c.as_str())
                    .map(str::to_string)
                    .or(parsed.error_code)
                    .or(parsed.error),
                message: parsed
                    .message
                    .or(parsed.msg)
                    .or(parsed.error_description)
                    .unwrap_or_else(|| body.to_string()),
            },
            Err(_) => ApiError::Server {
                status,
                code: None,
                message: body.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    /// A string for PostgREST, the HTTP status number for GoTrue.
    code: Option<serde_json::Value>,
    message: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgrest_body() {
        let err = ApiError::from_body(
            406,
            r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert!(err.is_no_rows());
        assert_eq!(err.status(), Some(406));
        assert_eq!(err.code(), Some("PGRST116"));
    }

    #[test]
    fn gotrue_body() {
        let err = ApiError::from_body(
            400,
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert_eq!(err.code(), Some("invalid_credentials"));
        assert_eq!(err.to_string(), "HTTP 400: Invalid login credentials");

        let err = ApiError::from_body(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        );
        assert_eq!(err.code(), Some("invalid_grant"));
        assert_eq!(err.to_string(), "HTTP 400: Invalid Refresh Token");
    }

    #[test]
    fn plain_text_body() {
        let err = ApiError::from_body(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn no_rows_needs_406() {
        let err = ApiError::Server {
            status: 400,
            code: Some(NO_ROWS.into()),
            message: String::new(),
        };
        assert!(!err.is_no_rows());
    }
}
