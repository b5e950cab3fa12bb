//! HTTP client for the Assistants API.
//!
//! [`AssistantsClient`] wraps a [`reqwest::Client`] with the auth and beta
//! headers every Assistants endpoint needs. Requests are issued one at a
//! time and never retried; a failed call surfaces as an [`ApiError`].

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::types::{ListResponse, Run, Thread, ThreadMessage, ToolOutput};
use super::AssistantsApi;
use crate::config::Config;
use crate::constants::ASSISTANTS_BETA_HEADER;

/// A configured connection to the Assistants API.
pub struct AssistantsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    project: Option<String>,
}

#[derive(Deserialize)]
struct Deleted {
    deleted: bool,
}

impl AssistantsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            organization: None,
            project: None,
        }
    }

    /// Builds a client from the resolved config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingApiKey`] when neither `OPENAI_API_KEY` nor
    /// `openai.api_key` is set.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api_key = config.resolve_api_key().ok_or(ApiError::MissingApiKey)?;
        let mut client = Self::new(config.base_url(), api_key);
        client.organization = config.openai.organization.clone();
        client.project = config.openai.project.clone();
        Ok(client)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "assistants request");
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER);
        if let Some(ref org) = self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(ref project) = self.project {
            builder = builder.header("OpenAI-Project", project);
        }
        builder
    }

    /// Sends a request and decodes a JSON body, mapping non-2xx to [`ApiError::Status`].
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "assistants response");

        if !status.is_success() {
            return Err(ApiError::from_body(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AssistantsApi for AssistantsClient {
    async fn create_thread(&self) -> Result<Thread, ApiError> {
        self.send(self.request(Method::POST, "/threads").json(&json!({})))
            .await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool, ApiError> {
        let path = format!("/threads/{}", thread_id);
        let deleted: Deleted = self.send(self.request(Method::DELETE, &path)).await?;
        Ok(deleted.deleted)
    }

    async fn add_user_message(&self, thread_id: &str, text: &str) -> Result<ThreadMessage, ApiError> {
        let path = format!("/threads/{}/messages", thread_id);
        let body = json!({ "role": "user", "content": text });
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ApiError> {
        let path = format!("/threads/{}/runs", thread_id);
        let body = json!({ "assistant_id": assistant_id });
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError> {
        let path = format!("/threads/{}/runs/{}", thread_id, run_id);
        self.send(self.request(Method::GET, &path)).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ApiError> {
        let path = format!("/threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id);
        let body = json!({ "tool_outputs": outputs });
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ApiError> {
        let path = format!("/threads/{}/runs/{}/cancel", thread_id, run_id);
        self.send(self.request(Method::POST, &path)).await
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>, ApiError> {
        let path = format!("/threads/{}/messages?order=desc&limit=1", thread_id);
        let list: ListResponse<ThreadMessage> = self.send(self.request(Method::GET, &path)).await?;
        Ok(list.data.into_iter().next())
    }

    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<ThreadMessage>, ApiError> {
        let path = format!("/threads/{}/messages?order=asc&limit={}", thread_id, limit);
        let list: ListResponse<ThreadMessage> = self.send(self.request(Method::GET, &path)).await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RunStatus;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AssistantsClient {
        AssistantsClient::new(format!("{}/v1", server.uri()), "sk-test")
    }

    #[tokio::test]
    async fn test_create_thread_sends_auth_and_beta_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-beta", "assistants=v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "thread_abc",
                "object": "thread",
                "created_at": 1_700_000_000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let thread = client_for(&server).create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_abc");
        assert_eq!(thread.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_organization_and_project_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads"))
            .and(header("openai-organization", "org_1"))
            .and(header("openai-project", "proj_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_x"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.openai.api_key = Some("sk-config".into());
        config.openai.base_url = Some(format!("{}/v1", server.uri()));
        config.openai.organization = Some("org_1".into());
        config.openai.project = Some("proj_1".into());

        // OPENAI_API_KEY in the environment may take precedence; headers are what matter here.
        let client = AssistantsClient::from_config(&config).unwrap();
        client.create_thread().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_user_message_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads/thread_abc/messages"))
            .and(body_json(json!({"role": "user", "content": "hello there"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "role": "user",
                "content": [{"type": "text", "text": {"value": "hello there", "annotations": []}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let msg = client_for(&server)
            .add_user_message("thread_abc", "hello there")
            .await
            .unwrap();
        assert_eq!(msg.text(), Some("hello there"));
    }

    #[tokio::test]
    async fn test_create_run_and_retrieve() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads/thread_abc/runs"))
            .and(body_json(json!({"assistant_id": "asst_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1", "thread_id": "thread_abc", "status": "queued"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/threads/thread_abc/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1", "thread_id": "thread_abc", "status": "completed"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let run = client.create_run("thread_abc", "asst_1").await.unwrap();
        assert_eq!(run.status, RunStatus::Queued);
        let run = client.retrieve_run("thread_abc", &run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_submit_tool_outputs_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads/thread_abc/runs/run_1/submit_tool_outputs"))
            .and(body_json(json!({
                "tool_outputs": [
                    {"tool_call_id": "call_1", "output": "sunny"},
                    {"tool_call_id": "call_2", "output": "42"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1", "thread_id": "thread_abc", "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outputs = vec![
            ToolOutput { tool_call_id: "call_1".into(), output: "sunny".into() },
            ToolOutput { tool_call_id: "call_2".into(), output: "42".into() },
        ];
        let run = client_for(&server)
            .submit_tool_outputs("thread_abc", "run_1", &outputs)
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn test_latest_message_queries_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/threads/thread_abc/messages"))
            .and(query_param("order", "desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{
                    "id": "msg_9",
                    "role": "assistant",
                    "content": [{"type": "text", "text": {"value": "Done.", "annotations": []}}]
                }],
                "has_more": true
            })))
            .mount(&server)
            .await;

        let msg = client_for(&server)
            .latest_message("thread_abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(msg.id, "msg_9");
        assert_eq!(msg.text(), Some("Done."));
    }

    #[tokio::test]
    async fn test_latest_message_empty_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/threads/thread_abc/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list", "data": []})))
            .mount(&server)
            .await;

        let msg = client_for(&server).latest_message("thread_abc").await.unwrap();
        assert!(msg.is_none());
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/threads/thread_missing/runs/run_1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No thread found with id 'thread_missing'.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .retrieve_run("thread_missing", "run_1")
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("thread_missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_delete_thread() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/threads/thread_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "thread_abc", "object": "thread.deleted", "deleted": true
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).delete_thread("thread_abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_from_config_without_key() {
        if std::env::var(crate::constants::API_KEY_ENV).is_ok() {
            return;
        }
        let err = AssistantsClient::from_config(&Config::default()).err().unwrap();
        assert!(matches!(err, ApiError::MissingApiKey));
    }
}
