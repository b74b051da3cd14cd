use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use studio_core::{DispatchOutcome, RoutedTask, ToolInput};
use tracing::{debug, error};

/// Invokes the routed tool and turns every failure into `NoResult`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolDispatcher {
    timeout: Option<Duration>,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn dispatch(&self, task: &RoutedTask, input: &ToolInput) -> DispatchOutcome {
        let tool_name = task.tool.name();
        debug!(tool = tool_name, instruction = %task.instruction, "dispatching tool");

        let call = AssertUnwindSafe(task.tool.invoke(input)).catch_unwind();
        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(caught) => caught,
                Err(_) => {
                    error!(
                        tool = tool_name,
                        intent = %task.intent,
                        timeout_ms = limit.as_millis() as u64,
                        "tool timed out"
                    );
                    return DispatchOutcome::NoResult {
                        reason: format!("tool `{tool_name}` timed out after {limit:?}"),
                    };
                }
            },
            None => call.await,
        };

        match caught {
            Ok(Ok(output)) => DispatchOutcome::Completed { output },
            Ok(Err(err)) => {
                error!(
                    tool = tool_name,
                    intent = %task.intent,
                    input = ?input,
                    error = %format!("{err:#}"),
                    "tool failed"
                );
                DispatchOutcome::NoResult {
                    reason: format!("tool `{tool_name}` failed: {err:#}"),
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    tool = tool_name,
                    intent = %task.intent,
                    input = ?input,
                    panic = %message,
                    "tool panicked"
                );
                DispatchOutcome::NoResult {
                    reason: format!("tool `{tool_name}` panicked: {message}"),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
