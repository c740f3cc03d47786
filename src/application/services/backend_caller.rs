//! Backend Caller - 带超时与取消的后端调用
//!
//! 所有服务都通过它调用文本生成后端：
//! - 调用前检查取消信号
//! - 调用过程中同时等待取消信号和超时
//! - 取消时丢弃正在进行的请求

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{GenerationError, GenerationRequest, TextGenerationPort};

#[derive(Clone)]
pub struct BackendCaller {
    backend: Arc<dyn TextGenerationPort>,
    call_timeout: Duration,
}

impl BackendCaller {
    pub fn new(backend: Arc<dyn TextGenerationPort>, call_timeout: Duration) -> Self {
        Self {
            backend,
            call_timeout,
        }
    }

    pub async fn call(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let prompt_len = request.user_prompt.len();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            outcome = tokio::time::timeout(self.call_timeout, self.backend.generate_text(request)) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(GenerationError::Timeout),
                }
            }
        };

        match &result {
            Ok(text) => tracing::trace!(
                prompt_len = prompt_len,
                response_len = text.len(),
                "Backend call completed"
            ),
            Err(e) => tracing::debug!(prompt_len = prompt_len, error = %e, "Backend call failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SlowBackend;

    #[async_trait]
    impl TextGenerationPort for SlowBackend {
        async fn generate_text(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("太慢了".to_string())
        }
    }

    #[tokio::test]
    async fn test_timeout_is_a_call_failure() {
        let caller = BackendCaller::new(Arc::new(SlowBackend), Duration::from_millis(20));
        let result = caller
            .call(GenerationRequest::new("hi"), &CancellationToken::new())
            .await;
        assert_eq!(result, Err(GenerationError::Timeout));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let caller = BackendCaller::new(Arc::new(SlowBackend), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = caller.call(GenerationRequest::new("hi"), &cancel).await;
        assert_eq!(result, Err(GenerationError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_during_call_discards_request() {
        let caller = BackendCaller::new(Arc::new(SlowBackend), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = caller.call(GenerationRequest::new("hi"), &cancel).await;
        assert_eq!(result, Err(GenerationError::Cancelled));
    }
}
