//! The agent orchestrator — the two-phase tool-calling protocol.
//!
//! A turn moves through: build the request from cached history → call
//! the provider through the circuit breaker → dispatch any tool
//! directives → call the provider again for the final text → ground
//! that text in the tool outcomes → persist and invalidate the cache.
//!
//! Tool rounds are capped by `agent.max_tool_rounds`; a model that
//! keeps requesting tools past the cap fails the turn with a structured
//! error instead of looping. Tool mutations committed before a later
//! failure are not rolled back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskmind_config::AgentConfig;
use taskmind_core::error::{AgentError, ProviderError};
use taskmind_core::event::{DomainEvent, EventBus};
use taskmind_core::message::{ConversationId, Message, ToolDirective};
use taskmind_core::provider::{CompletionRequest, CompletionResponse, Provider};
use taskmind_core::store::ConversationStore;
use taskmind_core::tool::{ToolCall, ToolOutcome, ToolRegistry};
use taskmind_resilience::{BreakerError, Circuit, CircuitBreaker};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::context::{ContextCache, truncate};
use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// A final text longer than this is treated as a malfunctioning model
/// rather than a real answer.
const MAX_RESPONSE_CHARS: usize = 10_000;

/// One executed tool call paired with its structured result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub call: ToolCall,
    pub outcome: ToolOutcome,
}

/// Whether the turn produced a real answer or fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// The immutable result of one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// The user-facing text.
    pub text: String,

    /// Every tool call executed this turn, in dispatch order.
    pub trace: Vec<ToolInvocation>,

    pub status: ReplyStatus,
}

/// Composes the context cache, tool dispatcher, circuit breaker, and
/// LLM provider into the two-phase protocol.
///
/// One orchestrator serves every conversation; the tool registry is
/// passed per call because tools are scoped to the requesting user.
pub struct AgentOrchestrator {
    provider: Arc<dyn Provider>,
    breaker: Arc<CircuitBreaker>,
    cache: Arc<ContextCache>,
    conversations: Arc<dyn ConversationStore>,
    events: Arc<EventBus>,
    model: String,
    config: AgentConfig,
}

impl AgentOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        breaker: Arc<CircuitBreaker>,
        cache: Arc<ContextCache>,
        conversations: Arc<dyn ConversationStore>,
        events: Arc<EventBus>,
        model: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            breaker,
            cache,
            conversations,
            events,
            model: model.into(),
            config,
        }
    }

    /// Run one chat turn.
    ///
    /// On success the user and assistant messages are persisted and the
    /// conversation's cache entry is dropped. On failure nothing is
    /// persisted, but tool mutations already committed stay committed.
    pub async fn handle(
        &self,
        conversation_id: &ConversationId,
        tools: &ToolRegistry,
        user_input: &str,
    ) -> Result<AgentReply, AgentError> {
        info!(conversation_id = %conversation_id, "Handling chat turn");

        let history = self.cache.get(conversation_id).await?;
        let history = truncate(history, self.config.max_context_tokens);

        let system_prompt = self
            .config
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let user_message = Message::user(user_input);
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(history);
        messages.push(user_message.clone());

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: messages.clone(),
            temperature: self.config.temperature,
            max_tokens: Some(self.config.max_response_tokens),
            tools: tools.catalogue(),
        };

        let mut response = match self.call_provider(request.clone(), conversation_id).await {
            // Some models reject requests carrying a tool catalogue;
            // degrade to a plain completion. The only retry in the system.
            Err(AgentError::Provider(ProviderError::ToolsUnsupported(reason))) => {
                warn!(
                    conversation_id = %conversation_id,
                    %reason,
                    "Provider rejected tool catalogue, retrying without tools"
                );
                self.call_provider(request.without_tools(), conversation_id)
                    .await?
            }
            other => other?,
        };

        let mut trace: Vec<ToolInvocation> = Vec::new();
        let mut rounds = 0u32;

        while !response.message.tool_calls.is_empty() {
            if rounds >= self.config.max_tool_rounds {
                warn!(
                    conversation_id = %conversation_id,
                    rounds,
                    "Model still requests tools past the round cap"
                );
                return Err(AgentError::MaxToolRounds { rounds });
            }
            rounds += 1;

            let tool_calls = response.message.tool_calls.clone();
            debug!(
                conversation_id = %conversation_id,
                count = tool_calls.len(),
                round = rounds,
                "Dispatching tool calls"
            );
            messages.push(response.message.clone());

            for raw in &tool_calls {
                let invocation = self.dispatch_one(raw, tools).await;
                messages.push(Message::tool_result(
                    &invocation.call.id,
                    invocation.outcome.wire_json(),
                ));
                trace.push(invocation);
            }

            // Second phase: the model sees the tool outcomes and
            // produces the final natural-language text.
            let follow_up = CompletionRequest {
                messages: messages.clone(),
                ..request.clone()
            };
            response = self.call_provider(follow_up, conversation_id).await?;
        }

        if let Some(usage) = &response.usage {
            self.events.publish(DomainEvent::ResponseGenerated {
                conversation_id: conversation_id.to_string(),
                model: response.model.clone(),
                tokens_used: usage.total_tokens,
                timestamp: Utc::now(),
            });
        }

        let text = ground_reply(&response.message.content, &trace);
        if trace.is_empty() {
            validate_plain_reply(&text)?;
        }

        self.conversations
            .append(conversation_id, user_message)
            .await?;
        self.conversations
            .append(conversation_id, Message::assistant(text.clone()))
            .await?;
        self.cache.invalidate(conversation_id).await;

        Ok(AgentReply {
            text,
            trace,
            status: ReplyStatus::Success,
        })
    }

    /// Execute a single tool directive at the dispatcher boundary.
    ///
    /// Never fails: malformed arguments and handler faults come back as
    /// error outcomes, which the model sees like any other tool result.
    async fn dispatch_one(&self, raw: &ToolDirective, tools: &ToolRegistry) -> ToolInvocation {
        let arguments = serde_json::from_str(&raw.arguments).unwrap_or_else(|e| {
            warn!(tool = %raw.name, error = %e, "Tool arguments are not valid JSON");
            serde_json::Value::Null
        });
        let call = ToolCall {
            id: raw.id.clone(),
            name: raw.name.clone(),
            arguments,
        };

        let started = std::time::Instant::now();
        let outcome = tools.dispatch(&call).await;
        self.events.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success: outcome.success,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });

        ToolInvocation { call, outcome }
    }

    /// One provider call, through the breaker and under a deadline.
    ///
    /// The deadline lives inside the breaker so a timed-out call is
    /// recorded as a breaker failure like any other transport fault.
    async fn call_provider(
        &self,
        request: CompletionRequest,
        conversation_id: &ConversationId,
    ) -> Result<CompletionResponse, AgentError> {
        let deadline = Duration::from_secs(self.config.request_timeout_secs);

        let result = self
            .breaker
            .call(async {
                match timeout(deadline, self.provider.complete(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(format!(
                        "no response after {}s",
                        deadline.as_secs()
                    ))),
                }
            })
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(BreakerError::Open) => {
                warn!(conversation_id = %conversation_id, "Circuit open, provider call rejected");
                Err(AgentError::CircuitOpen)
            }
            Err(BreakerError::Service(e)) => {
                warn!(conversation_id = %conversation_id, error = %e, "Provider call failed");
                if self.breaker.circuit() == Circuit::Open {
                    self.events.publish(DomainEvent::CircuitTripped {
                        failure_count: self.breaker.failure_count(),
                        timestamp: Utc::now(),
                    });
                }
                Err(AgentError::Provider(e))
            }
        }
    }
}

/// The grounding rule: what the user is told about store state comes
/// from the tool outcome, never from the model's narrative.
///
/// With no tool calls the model text passes through. With tool calls,
/// the first outcome's text replaces the model text when the tool
/// failed, when the tool was `list_tasks`, or when the model text is
/// empty or generic boilerplate; otherwise the outcome text is appended
/// beneath the model's own words.
fn ground_reply(model_text: &str, trace: &[ToolInvocation]) -> String {
    let Some(first) = trace.first() else {
        return model_text.to_string();
    };
    let outcome_text = first.outcome.explanation();

    if !first.outcome.success
        || first.call.name == "list_tasks"
        || model_text.trim().is_empty()
        || is_generic(model_text)
    {
        outcome_text.to_string()
    } else {
        format!("{model_text}\n\n{outcome_text}")
    }
}

/// A short placeholder like "Operation completed." adds nothing the
/// tool outcome doesn't already say better.
fn is_generic(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() < 50 && trimmed.to_lowercase().contains("operation")
}

/// Sanity checks for a turn that invoked no tools. An empty or
/// implausibly long text means the model malfunctioned; fail the turn
/// so the fallback policy produces the reply instead.
fn validate_plain_reply(text: &str) -> Result<(), AgentError> {
    if text.trim().is_empty() {
        return Err(AgentError::Internal("model returned an empty response".into()));
    }
    if text.len() > MAX_RESPONSE_CHARS {
        return Err(AgentError::Internal(format!(
            "model response implausibly long ({} chars)",
            text.len()
        )));
    }
    Ok(())
}
