use crate::models::{CreateTodoInput, SortOption, Todo, TodoStatus, UpdateTodoInput};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

// Responses are wrapped in a { data, meta? } envelope
#[derive(Deserialize, Debug)]
struct ListEnvelope {
    data: Vec<Todo>,
    #[serde(default)]
    #[allow(dead_code)]
    meta: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct ItemEnvelope {
    data: Todo,
}

/// Stateless translation layer between typed operations and the REST API.
/// Holds the base URL fixed at startup and one reused `reqwest::Client`;
/// errors propagate to the caller unmodified, with no retry.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

fn list_params(status: TodoStatus, sort: SortOption, search: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("status", status.as_query().to_string()),
        ("sort", sort.as_query().to_string()),
    ];
    if let Some(q) = search {
        // passed through as typed, the server owns the matching
        params.push(("q", q.to_string()));
    }
    params
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }

    pub async fn list_todos(
        &self,
        status: TodoStatus,
        sort: SortOption,
        search: Option<&str>,
    ) -> Result<Vec<Todo>, ApiError> {
        let res = self
            .http
            .get(self.todos_url())
            .query(&list_params(status, sort, search))
            .send()
            .await?;
        let envelope: ListEnvelope = check_status(res).await?.json().await?;
        Ok(envelope.data)
    }

    pub async fn get_todo(&self, id: &str) -> Result<Todo, ApiError> {
        let res = self.http.get(self.todo_url(id)).send().await?;
        let envelope: ItemEnvelope = check_status(res).await?.json().await?;
        Ok(envelope.data)
    }

    pub async fn create_todo(&self, input: &CreateTodoInput) -> Result<Todo, ApiError> {
        let res = self
            .http
            .post(self.todos_url())
            .json(input)
            .send()
            .await?;
        let envelope: ItemEnvelope = check_status(res).await?.json().await?;
        Ok(envelope.data)
    }

    pub async fn update_todo(&self, id: &str, input: &UpdateTodoInput) -> Result<Todo, ApiError> {
        let res = self
            .http
            .put(self.todo_url(id))
            .json(input)
            .send()
            .await?;
        let envelope: ItemEnvelope = check_status(res).await?.json().await?;
        Ok(envelope.data)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<(), ApiError> {
        let res = self.http.delete(self.todo_url(id)).send().await?;
        check_status(res).await?;
        Ok(())
    }
}

// Map non-success status codes to the ApiError taxonomy: 404 is NotFound,
// other 4xx carry the server's validation message, 5xx are Server errors.
async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let message = res.text().await.unwrap_or_default();
    if status.is_client_error() {
        return Err(ApiError::Validation(message));
    }
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = ApiClient::new("http://localhost:4000/api/");
        assert_eq!(client.todos_url(), "http://localhost:4000/api/todos");
        assert_eq!(
            client.todo_url("abc-123"),
            "http://localhost:4000/api/todos/abc-123"
        );
    }

    #[test]
    fn list_params_without_search() {
        let params = list_params(TodoStatus::Open, SortOption::PriorityDesc, None);
        assert_eq!(
            params,
            vec![
                ("status", "open".to_string()),
                ("sort", "priority_desc".to_string()),
            ]
        );
    }

    #[test]
    fn list_params_with_search_passes_text_through() {
        let params = list_params(
            TodoStatus::All,
            SortOption::CreatedAtDesc,
            Some("milk & eggs"),
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], ("q", "milk & eggs".to_string()));
    }

    #[test]
    fn list_envelope_tolerates_missing_meta() {
        let envelope: ListEnvelope = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert!(envelope.data.is_empty());
    }
}
