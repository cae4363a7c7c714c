//! In-process [`BackgroundPort`] bound to one sender.

use std::sync::Arc;

use async_trait::async_trait;

use stagehand_protocols::{
    BackgroundPort, BackgroundRequest, BackgroundResponse, MessageSender, ProtocolError,
};

use crate::coordinator::BackgroundCoordinator;

pub struct LocalBackgroundPort {
    coordinator: Arc<BackgroundCoordinator>,
    sender: MessageSender,
}

impl LocalBackgroundPort {
    pub fn new(coordinator: Arc<BackgroundCoordinator>, sender: MessageSender) -> Self {
        Self {
            coordinator,
            sender,
        }
    }
}

#[async_trait]
impl BackgroundPort for LocalBackgroundPort {
    async fn request(&self, request: BackgroundRequest) -> Result<BackgroundResponse, ProtocolError> {
        let action = request.action();
        self.coordinator
            .handle(request, Some(self.sender))
            .await
            .ok_or_else(|| ProtocolError::UnexpectedResponse(format!("{action} has no response")))
    }

    async fn post(&self, request: BackgroundRequest) -> Result<(), ProtocolError> {
        self.coordinator.handle(request, Some(self.sender)).await;
        Ok(())
    }
}
