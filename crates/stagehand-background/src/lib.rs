//! # Stagehand Background
//!
//! The long-lived background context: a time-bounded [`ConfigCache`] over the
//! remote configuration document, the [`BackgroundCoordinator`] that answers
//! page requests, the relay of completed CRM requests to pages, and the
//! declarative rule that lets the CRM render inside frames.
//!
//! Browser facilities are reached only through the [`ConfigStorage`],
//! [`TabMessenger`], [`RuleRegistry`] and [`ScriptExecutor`] traits.

mod cache;
mod coordinator;
mod error;
mod local;
mod relay;
mod rules;
mod scripting;
mod source;
mod storage;
mod webrequest;

pub use cache::ConfigCache;
pub use coordinator::{BackgroundCoordinator, DEFAULT_FRAME_RULE_DOMAIN};
pub use error::{BackgroundError, ConfigFetchError, StorageError};
pub use local::LocalBackgroundPort;
pub use relay::{RequestRelay, TabMessenger, UrlPattern};
pub use rules::{
    FRAME_BLOCKING_HEADERS, FRAME_HEADER_RULE_ID, HeaderModification, HeaderOperation,
    MemoryRuleRegistry, NetworkRule, RuleAction, RuleActionType, RuleCondition, RuleRegistry,
    frame_header_rule,
};
pub use scripting::{PageScript, ScriptExecutor, Select2Options};
pub use source::{ConfigSource, HttpConfigSource};
pub use storage::{ConfigStorage, FileConfigStorage, MemoryConfigStorage};
pub use webrequest::{FrameType, ResourceType, WebRequestEvent};
