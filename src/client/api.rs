//! HTTP client for the project API
//!
//! `ProjectsApi` is the seam the list controller and projector talk through;
//! `HttpProjectsApi` implements it over reqwest and attaches the bearer token
//! to every request.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    FavoritesResponse, MessageResponse, PageRequest, Project, ProjectId, ProjectInput,
    ProjectPage, ProjectPageResponse, ProjectResponse, ProjectStatistics, RankBatchRequest,
    RankUpdate,
};

/// Operations the ordering subsystem needs from the server
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    /// GET /projects
    async fn list_projects(&self, request: &PageRequest) -> AppResult<ProjectPage>;

    /// PUT /project/update-orders
    async fn set_ranks(&self, updates: &[RankUpdate]) -> AppResult<MessageResponse>;

    /// PUT /project/{id}/changeFavorite
    async fn toggle_favorite(&self, id: ProjectId) -> AppResult<MessageResponse>;

    /// PUT /project/{id}/changeQuickAccess
    async fn add_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse>;

    /// PUT /project/{id}/removeQuickAccess
    async fn remove_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse>;

    /// GET /project/statistics
    async fn statistics(&self) -> AppResult<ProjectStatistics>;

    /// DELETE /projects/{id}
    async fn delete_project(&self, id: ProjectId) -> AppResult<MessageResponse>;
}

/// reqwest-backed API client
#[derive(Debug, Clone)]
pub struct HttpProjectsApi {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpProjectsApi {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:19836`)
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a custom HTTP client
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client: client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /projects
    pub async fn create_project(&self, input: &ProjectInput) -> AppResult<Project> {
        let response: ProjectResponse = self
            .send_json(self.request(Method::POST, "/projects").json(input))
            .await?;
        Ok(response.project)
    }

    /// GET /projects/{id}
    pub async fn get_project(&self, id: ProjectId) -> AppResult<Project> {
        let response: ProjectResponse = self
            .send_json(self.request(Method::GET, &format!("/projects/{}", id)))
            .await?;
        Ok(response.project)
    }

    /// PUT /projects/{id}
    pub async fn update_project(&self, id: ProjectId, input: &ProjectInput) -> AppResult<Project> {
        let response: ProjectResponse = self
            .send_json(
                self.request(Method::PUT, &format!("/projects/{}", id))
                    .json(input),
            )
            .await?;
        Ok(response.project)
    }

    /// GET /project/myFavorites
    pub async fn favorites(&self) -> AppResult<Vec<Project>> {
        let response: FavoritesResponse = self
            .send_json(self.request(Method::GET, "/project/myFavorites"))
            .await?;
        Ok(response.favorite)
    }

    /// GET /project/quickAccess
    pub async fn quick_access(&self) -> AppResult<Vec<Project>> {
        self.send_json(self.request(Method::GET, "/project/quickAccess"))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http_client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn put_message(&self, path: &str) -> AppResult<MessageResponse> {
        self.send_json(self.request(Method::PUT, path)).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &body));
        }

        response.json::<T>().await.map_err(|e| AppError::Server {
            status: status.as_u16(),
            message: format!("invalid response body: {}", e),
        })
    }
}

/// Rebuild an [`AppError`] from a non-success response
pub fn error_from_status(status: StatusCode, body: &str) -> AppError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.error.clone())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            match parsed.and_then(|b| b.errors) {
                Some(errors) if !errors.is_empty() => AppError::ValidationFailed(errors),
                _ => AppError::invalid("request", message),
            }
        }
        _ => AppError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Serialize)]
struct ListQuery<'a> {
    page: u32,
    per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[async_trait]
impl ProjectsApi for HttpProjectsApi {
    async fn list_projects(&self, request: &PageRequest) -> AppResult<ProjectPage> {
        let query = ListQuery {
            page: request.page,
            per_page: request.per_page,
            search: request.search.as_deref(),
        };
        let response: ProjectPageResponse = self
            .send_json(self.request(Method::GET, "/projects").query(&query))
            .await?;
        Ok(response.projects)
    }

    async fn set_ranks(&self, updates: &[RankUpdate]) -> AppResult<MessageResponse> {
        let body = RankBatchRequest {
            projects: updates.to_vec(),
        };
        self.send_json(
            self.request(Method::PUT, "/project/update-orders")
                .json(&body),
        )
        .await
    }

    async fn toggle_favorite(&self, id: ProjectId) -> AppResult<MessageResponse> {
        self.put_message(&format!("/project/{}/changeFavorite", id))
            .await
    }

    async fn add_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse> {
        self.put_message(&format!("/project/{}/changeQuickAccess", id))
            .await
    }

    async fn remove_quick_access(&self, id: ProjectId) -> AppResult<MessageResponse> {
        self.put_message(&format!("/project/{}/removeQuickAccess", id))
            .await
    }

    async fn statistics(&self) -> AppResult<ProjectStatistics> {
        self.send_json(self.request(Method::GET, "/project/statistics"))
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<MessageResponse> {
        self.send_json(self.request(Method::DELETE, &format!("/projects/{}", id)))
            .await
    }
}
