//! Line-delimited JSON bridge between the browser shell and the coordinator.
//!
//! The shell writes one [`Inbound`] envelope per line on stdin. Everything
//! the coordinator asks of the browser comes back as [`Outbound`] envelopes
//! on stdout.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use stagehand_background::{
    BackgroundCoordinator, BackgroundError, MemoryRuleRegistry, NetworkRule, PageScript, RuleRegistry,
    ScriptExecutor, TabMessenger, WebRequestEvent,
};
use stagehand_protocols::{BackgroundRequest, BackgroundResponse, MessageSender, PageMessage};

/// Envelope received from the browser shell.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// A page request. `id` correlates the response.
    Request {
        id: u64,
        #[serde(default)]
        sender: Option<MessageSender>,
        request: BackgroundRequest,
    },
    Installed,
    Startup,
    RequestCompleted { event: WebRequestEvent },
}

/// Envelope sent to the browser shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Response {
        id: u64,
        response: BackgroundResponse,
    },
    SendToTab {
        #[serde(rename = "tabId")]
        tab_id: i64,
        #[serde(rename = "frameId", skip_serializing_if = "Option::is_none")]
        frame_id: Option<i64>,
        message: PageMessage,
    },
    UpdateRules {
        #[serde(rename = "removeRuleIds")]
        remove_rule_ids: Vec<u32>,
        #[serde(rename = "addRules")]
        add_rules: Vec<NetworkRule>,
    },
    ExecuteScript {
        #[serde(rename = "tabId")]
        tab_id: i64,
        script: PageScript,
    },
}

/// Browser-facing ports backed by the outbound channel.
///
/// The host is the only writer of the dynamic rule set, so rule ids are
/// tracked locally instead of being queried from the shell.
pub struct StdioBridge {
    outbound: mpsc::UnboundedSender<Outbound>,
    rules: MemoryRuleRegistry,
}

impl StdioBridge {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let bridge = Self {
            outbound,
            rules: MemoryRuleRegistry::new(),
        };
        (bridge, rx)
    }

    fn emit(&self, envelope: Outbound) -> Result<(), String> {
        self.outbound
            .send(envelope)
            .map_err(|_| "outbound channel closed".to_string())
    }

    pub fn respond(&self, id: u64, response: BackgroundResponse) {
        if let Err(e) = self.emit(Outbound::Response { id, response }) {
            warn!(id, error = %e, "Dropped response");
        }
    }
}

#[async_trait]
impl TabMessenger for StdioBridge {
    async fn send_to_tab(
        &self,
        tab_id: i64,
        frame_id: Option<i64>,
        message: PageMessage,
    ) -> Result<(), BackgroundError> {
        self.emit(Outbound::SendToTab {
            tab_id,
            frame_id,
            message,
        })
        .map_err(BackgroundError::Messaging)
    }
}

#[async_trait]
impl RuleRegistry for StdioBridge {
    async fn dynamic_rule_ids(&self) -> Result<Vec<u32>, BackgroundError> {
        self.rules.dynamic_rule_ids().await
    }

    async fn update_dynamic_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<NetworkRule>,
    ) -> Result<(), BackgroundError> {
        self.rules
            .update_dynamic_rules(remove_ids.clone(), add_rules.clone())
            .await?;
        self.emit(Outbound::UpdateRules {
            remove_rule_ids: remove_ids,
            add_rules,
        })
        .map_err(BackgroundError::Rules)
    }
}

#[async_trait]
impl ScriptExecutor for StdioBridge {
    async fn execute(&self, tab_id: i64, script: PageScript) -> Result<(), BackgroundError> {
        self.emit(Outbound::ExecuteScript { tab_id, script })
            .map_err(BackgroundError::Script)
    }
}

/// Handle one inbound envelope to completion.
pub async fn dispatch(coordinator: &BackgroundCoordinator, bridge: &StdioBridge, inbound: Inbound) {
    match inbound {
        Inbound::Request {
            id,
            sender,
            request,
        } => {
            if let Some(response) = coordinator.handle(request, sender).await {
                bridge.respond(id, response);
            }
        }
        Inbound::Installed => coordinator.on_installed().await,
        Inbound::Startup => coordinator.on_startup().await,
        Inbound::RequestCompleted { event } => {
            coordinator.on_request_completed(&event).await;
        }
    }
}

/// Read envelopes until EOF.
///
/// Completed-request events are relayed inline so pages see them in arrival
/// order. Everything else runs on its own task.
pub async fn serve<R>(
    reader: R,
    coordinator: Arc<BackgroundCoordinator>,
    bridge: Arc<StdioBridge>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut tasks = tokio::task::JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let inbound: Inbound = match serde_json::from_str(&line) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed envelope");
                continue;
            }
        };
        debug!(?inbound, "Inbound envelope");
        if let Inbound::RequestCompleted { event } = &inbound {
            coordinator.on_request_completed(event).await;
            continue;
        }
        let coordinator = coordinator.clone();
        let bridge = bridge.clone();
        tasks.spawn(async move { dispatch(&coordinator, &bridge, inbound).await });
    }
    while tasks.join_next().await.is_some() {}
    Ok(())
}

/// Write outbound envelopes as JSON lines until every sender is gone.
pub async fn write_outbound<W>(mut rx: mpsc::UnboundedReceiver<Outbound>, mut writer: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = rx.recv().await {
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
