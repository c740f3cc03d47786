//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{ComposeDraftResponse, ComposePlanResponse, GenerateStoryResponse};
use crate::domain::story::{Draft, StoryPlan};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Story DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ComposePlanRequest {
    pub premise: String,
}

#[derive(Debug, Deserialize)]
pub struct ComposeDraftRequest {
    pub context_digest: String,
    pub outline: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    pub premise: String,
}

#[derive(Debug, Serialize)]
pub struct CharacterDto {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct PlanDto {
    pub premise: String,
    pub setting: String,
    pub characters: Vec<CharacterDto>,
    pub outline: Vec<String>,
    pub context_digest: String,
}

impl From<&StoryPlan> for PlanDto {
    fn from(plan: &StoryPlan) -> Self {
        Self {
            premise: plan.premise().to_string(),
            setting: plan.setting().to_string(),
            characters: plan
                .characters()
                .iter()
                .map(|c| CharacterDto {
                    name: c.name.clone(),
                    description: c.description.clone(),
                })
                .collect(),
            outline: plan.outline().to_vec(),
            context_digest: plan.context_digest().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DraftDto {
    pub sections: Vec<String>,
    pub full_text: String,
    pub char_count: usize,
}

impl From<&Draft> for DraftDto {
    fn from(draft: &Draft) -> Self {
        let full_text = draft.full_text();
        Self {
            sections: draft.sections().to_vec(),
            char_count: full_text.chars().count(),
            full_text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub story_id: Uuid,
    pub plan: PlanDto,
    pub generated_at: String,
}

impl From<ComposePlanResponse> for PlanResponse {
    fn from(response: ComposePlanResponse) -> Self {
        Self {
            story_id: response.story_id,
            plan: PlanDto::from(&response.plan),
            generated_at: response.generated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub story_id: Uuid,
    pub draft: DraftDto,
    pub generated_at: String,
}

impl From<ComposeDraftResponse> for DraftResponse {
    fn from(response: ComposeDraftResponse) -> Self {
        Self {
            story_id: response.story_id,
            draft: DraftDto::from(&response.draft),
            generated_at: response.generated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story_id: Uuid,
    pub plan: PlanDto,
    pub draft: DraftDto,
    pub generated_at: String,
}

impl From<GenerateStoryResponse> for StoryResponse {
    fn from(response: GenerateStoryResponse) -> Self {
        Self {
            story_id: response.story_id,
            plan: PlanDto::from(&response.plan),
            draft: DraftDto::from(&response.draft),
            generated_at: response.generated_at.to_rfc3339(),
        }
    }
}
