//! 服务测试用的脚本化后端
//!
//! 按提示词类别回复，并记录每一次调用。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BackendCaller, PipelineConfig};
use crate::application::ports::{GenerationError, GenerationRequest, TextGenerationPort};
use crate::application::prompts::PromptKind;

type Responder =
    dyn Fn(Option<PromptKind>, usize) -> Result<String, GenerationError> + Send + Sync;

pub(crate) struct ScriptedBackend {
    responder: Box<Responder>,
    calls: Mutex<Vec<(Option<PromptKind>, GenerationRequest)>>,
}

impl ScriptedBackend {
    /// `responder` 收到提示词类别和该类别之前的调用次数
    pub(crate) fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(Option<PromptKind>, usize) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 某类提示词的全部用户提示词，按调用顺序
    pub(crate) fn prompts(&self, kind: PromptKind) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == Some(kind))
            .map(|(_, request)| request.user_prompt.clone())
            .collect()
    }

    pub(crate) fn count(&self, kind: PromptKind) -> usize {
        self.prompts(kind).len()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerationPort for ScriptedBackend {
    async fn generate_text(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let kind = PromptKind::detect(&request.user_prompt);
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            let seen = calls.iter().filter(|(k, _)| *k == kind).count();
            calls.push((kind, request));
            seen
        };
        (self.responder)(kind, seen)
    }
}

/// 测试用配置：单并发，保证调用顺序确定
pub(crate) fn test_config() -> PipelineConfig {
    PipelineConfig {
        max_concurrent: 1,
        call_timeout: Duration::from_secs(5),
        ..PipelineConfig::default()
    }
}

pub(crate) fn caller(backend: Arc<ScriptedBackend>) -> BackendCaller {
    BackendCaller::new(backend, Duration::from_secs(5))
}
