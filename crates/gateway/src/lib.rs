//! HTTP gateway for taskmind.
//!
//! A thin axum layer over the agent subsystem: one chat route and a
//! health probe. Everything stateful (orchestrator, fallback policy,
//! stores) is constructed in `main` and injected here; the handlers
//! hold no logic beyond request shaping.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskmind_agent::{AgentOrchestrator, FallbackPolicy, ReplyStatus, ToolInvocation};
use taskmind_core::message::ConversationId;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{StateReflection, UserId};
use taskmind_tools::registry_for_user;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Requests without a usable `user_id` act on behalf of this user, so
/// an anonymous chat still lands in a consistent task list.
pub const DEFAULT_USER: &str = "default-user";

/// Everything the handlers need, built once at startup.
pub struct GatewayState {
    pub orchestrator: AgentOrchestrator,
    pub fallback: FallbackPolicy,
    pub tasks: Arc<dyn TaskStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "taskmind".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The user-facing reply text.
    pub response: String,

    /// The conversation this turn was appended to. Echoed back so a
    /// client that let the server pick an id can keep the thread going.
    pub conversation_id: String,

    /// Snapshot of the user's task state after the turn.
    pub state_reflection: StateReflection,

    /// The tool calls executed this turn, or `null` when none ran.
    pub tool_execution_result: Option<ToolExecutionResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub status: ReplyStatus,
    pub tool_calls: Vec<ToolInvocation>,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if request.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let owner = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(UserId::from)
        .unwrap_or_else(|| UserId::from(DEFAULT_USER));

    let conversation_id = request
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ConversationId::from)
        .unwrap_or_default();

    info!(
        conversation_id = %conversation_id,
        user_id = %owner,
        "Chat request received"
    );

    let registry = registry_for_user(state.tasks.clone(), owner.clone());
    let result = state
        .orchestrator
        .handle(&conversation_id, &registry, &request.message)
        .await;
    let reply = state.fallback.recover(result, &conversation_id.0);

    let tool_execution_result = if reply.trace.is_empty() {
        None
    } else {
        Some(ToolExecutionResult {
            status: reply.status,
            tool_calls: reply.trace,
        })
    };

    Ok(Json(ChatResponse {
        response: reply.text,
        conversation_id: conversation_id.0,
        state_reflection: reflect_state(state.tasks.as_ref(), &owner).await,
        tool_execution_result,
    }))
}

/// Summarize the owner's task state for the response envelope. A store
/// fault here degrades to an empty summary; the chat reply itself has
/// already been produced.
async fn reflect_state(tasks: &dyn TaskStore, owner: &UserId) -> StateReflection {
    let counts = tasks.counts_by_status(owner).await.unwrap_or_default();
    StateReflection {
        user_id: owner.to_string(),
        task_count: counts.values().sum(),
        task_counts_by_status: counts
            .into_iter()
            .map(|(status, n)| (status.as_str().to_string(), n))
            .collect(),
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    use taskmind_agent::ContextCache;
    use taskmind_config::{AgentConfig, FallbackConfig};
    use taskmind_core::error::ProviderError;
    use taskmind_core::event::EventBus;
    use taskmind_core::message::{Message, ToolDirective};
    use taskmind_core::provider::{CompletionRequest, CompletionResponse, Provider};
    use taskmind_core::task::Task;
    use taskmind_resilience::CircuitBreaker;
    use taskmind_store::{InMemoryConversationStore, InMemoryTaskStore};

    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::MalformedResponse("script exhausted".into())))
        }
    }

    fn text(content: &str) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            message: Message::assistant(content),
            usage: None,
            model: "scripted-model".into(),
        })
    }

    fn tool_call(name: &str, arguments: &str) -> Result<CompletionResponse, ProviderError> {
        let mut message = Message::assistant("");
        message.tool_calls = vec![ToolDirective {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }];
        Ok(CompletionResponse {
            message,
            usage: None,
            model: "scripted-model".into(),
        })
    }

    fn test_state(
        script: Vec<Result<CompletionResponse, ProviderError>>,
    ) -> (SharedState, Arc<InMemoryTaskStore>) {
        let provider = Arc::new(ScriptedProvider {
            script: Mutex::new(script.into()),
        });
        let tasks = Arc::new(InMemoryTaskStore::new());
        let conversations = Arc::new(InMemoryConversationStore::new());
        let cache = Arc::new(ContextCache::new(
            conversations.clone(),
            ContextCache::DEFAULT_TTL,
        ));

        let orchestrator = AgentOrchestrator::new(
            provider,
            Arc::new(CircuitBreaker::new(3, Duration::from_secs(30))),
            cache,
            conversations,
            Arc::new(EventBus::default()),
            "scripted-model",
            AgentConfig::default(),
        );

        let state = Arc::new(GatewayState {
            orchestrator,
            fallback: FallbackPolicy::new(FallbackConfig::default()),
            tasks: tasks.clone(),
        });
        (state, tasks)
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    async fn read_chat_response(response: axum::response::Response) -> ChatResponse {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (state, _) = test_state(vec![]);
        let app = build_router(state);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.service, "taskmind");
    }

    #[tokio::test]
    async fn chat_plain_turn() {
        let (state, _) = test_state(vec![text("Hello! How can I help?")]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "hi",
                "user_id": "u1",
                "conversation_id": "c1"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let chat = read_chat_response(response).await;
        assert_eq!(chat.response, "Hello! How can I help?");
        assert_eq!(chat.conversation_id, "c1");
        assert!(chat.tool_execution_result.is_none());
        assert_eq!(chat.state_reflection.task_count, 0);
    }

    #[tokio::test]
    async fn chat_tool_turn_reports_execution_and_state() {
        let (state, tasks) = test_state(vec![
            tool_call("create_task", r#"{"title": "gym"}"#),
            text("Added!"),
        ]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "add gym",
                "user_id": "u1"
            })))
            .await
            .unwrap();
        let chat = read_chat_response(response).await;

        assert!(chat.response.contains("gym"));
        let result = chat.tool_execution_result.unwrap();
        assert_eq!(result.status, ReplyStatus::Success);
        assert_eq!(result.tool_calls.len(), 1);
        assert_eq!(result.tool_calls[0].call.name, "create_task");

        assert_eq!(chat.state_reflection.user_id, "u1");
        assert_eq!(chat.state_reflection.task_count, 1);
        assert_eq!(chat.state_reflection.task_counts_by_status["pending"], 1);

        // And the task is really in the store, owned by u1.
        assert!(tasks
            .find_by_title("gym", &UserId::from("u1"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn missing_user_resolves_to_default_user() {
        let (state, tasks) = test_state(vec![
            tool_call("create_task", r#"{"title": "gym"}"#),
            text("Added!"),
        ]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({"message": "add gym"})))
            .await
            .unwrap();
        let chat = read_chat_response(response).await;

        assert_eq!(chat.state_reflection.user_id, DEFAULT_USER);
        assert!(tasks
            .find_by_title("gym", &UserId::from(DEFAULT_USER))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn missing_conversation_id_gets_generated() {
        let (state, _) = test_state(vec![text("Hi!")]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({"message": "hi"})))
            .await
            .unwrap();
        let chat = read_chat_response(response).await;
        assert!(!chat.conversation_id.is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (state, _) = test_state(vec![]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({"message": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_failure_returns_fallback_text_not_detail() {
        let (state, _) = test_state(vec![Err(ProviderError::ApiError {
            status_code: 500,
            message: "secret internal detail".into(),
        })]);
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "hi",
                "conversation_id": "c1"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let chat = read_chat_response(response).await;
        assert!(!chat.response.contains("secret internal detail"));
        assert_eq!(chat.response, FallbackConfig::default().default);
        assert!(chat.tool_execution_result.is_none());
    }

    #[tokio::test]
    async fn state_reflection_is_owner_scoped() {
        let (state, tasks) = test_state(vec![text("Hi!")]);
        tasks
            .create(Task::new(UserId::from("someone-else"), "their task"))
            .await
            .unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "hi",
                "user_id": "u1"
            })))
            .await
            .unwrap();
        let chat = read_chat_response(response).await;
        assert_eq!(chat.state_reflection.task_count, 0);
    }
}
