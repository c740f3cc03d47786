//! 有界重试
//!
//! 计划阶段的三个步骤（背景、角色、大纲）共用同一个重试循环：
//! 每次调用后用 `accept` 检查回复形状，失败立即重试（无退避），
//! 最多 `max_attempts` 次。取消不会重试。

use std::future::Future;

use crate::application::error::{Stage, StoryError};
use crate::application::ports::GenerationError;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// 重复调用 `call`，直到 `accept` 接受回复或次数用尽
///
/// 返回最后一次失败的错误：后端失败为 `Generation`，形状不符为 `Validation`。
pub async fn retry_bounded<T, F, Fut, P>(
    policy: RetryPolicy,
    stage: Stage,
    mut call: F,
    mut accept: P,
) -> Result<T, StoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GenerationError>>,
    P: FnMut(&str) -> Result<T, String>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        let error = match call().await {
            Ok(response) => match accept(&response) {
                Ok(value) => {
                    tracing::debug!(
                        phase = %stage.phase,
                        attempt = attempt,
                        response_len = response.len(),
                        "Response accepted"
                    );
                    return Ok(value);
                }
                Err(message) => StoryError::validation(stage, message),
            },
            Err(e) => StoryError::generation(stage, e),
        };

        if !error.is_retryable() {
            return Err(error);
        }

        tracing::warn!(
            phase = %stage.phase,
            attempt = attempt,
            max_attempts = max_attempts,
            error = %error,
            "Attempt failed"
        );
        last_error = Some(error);
    }

    Err(last_error.unwrap_or_else(|| StoryError::validation(stage, "no attempt was made")))
}
