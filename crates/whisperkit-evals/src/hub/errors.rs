use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::RequestFailed(err.to_string())
    }
}

// Maps a non-ok response status to a HubError
pub async fn non_ok_response_to_hub_error(response: Response) -> HubError {
    let status = response.status();
    let url = response.url().to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HubError::Authentication(format!(
            "Please ensure HF_TOKEN is valid and has write access. Status: {}. Response: {:?}",
            status,
            response.text().await.unwrap_or_default()
        )),
        StatusCode::NOT_FOUND => HubError::NotFound(url),
        StatusCode::TOO_MANY_REQUESTS => HubError::RateLimitExceeded(format!(
            "Rate limit exceeded. Please retry after some time. Status: {}",
            status
        )),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => {
            HubError::ServerError(format!("Server error occurred. Status: {}", status))
        }
        _ => {
            tracing::debug!(
                "Hub request to {} failed with status: {}. Body: {:?}",
                url,
                status,
                response.text().await.unwrap_or_default()
            );
            HubError::RequestFailed(format!("Request failed with status: {}.", status))
        }
    }
}
