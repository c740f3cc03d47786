//! Story Context - 评分规则
//!
//! 三个评审维度的分值都落在 [1.0, 10.0]，加权和即为候选稿总分。

use super::StoryDomainError;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// 权重之和允许的误差
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// 把分值限制在 [1.0, 10.0]
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// 评审维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreDimension {
    /// 连贯性
    Coherence,
    /// 内容质量
    Quality,
    /// 表达流畅度
    Fluency,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 3] = [Self::Coherence, Self::Quality, Self::Fluency];

    /// 评审回复中该维度的标签文本
    pub fn label(&self) -> &'static str {
        match self {
            Self::Coherence => "连贯性",
            Self::Quality => "内容质量",
            Self::Fluency => "表达流畅度",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coherence => "coherence",
            Self::Quality => "quality",
            Self::Fluency => "fluency",
        }
    }
}

impl std::fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 维度权重（和为 1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    coherence: f64,
    quality: f64,
    fluency: f64,
}

impl ScoreWeights {
    pub fn new(coherence: f64, quality: f64, fluency: f64) -> Result<Self, StoryDomainError> {
        if [coherence, quality, fluency]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(StoryDomainError::InvalidWeights(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        let sum = coherence + quality + fluency;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(StoryDomainError::InvalidWeights(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(Self {
            coherence,
            quality,
            fluency,
        })
    }

    pub fn weight(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Coherence => self.coherence,
            ScoreDimension::Quality => self.quality,
            ScoreDimension::Fluency => self.fluency,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            coherence: 0.4,
            quality: 0.3,
            fluency: 0.3,
        }
    }
}

/// 一个候选稿的三项评审分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticScores {
    pub coherence: f64,
    pub quality: f64,
    pub fluency: f64,
}

impl CriticScores {
    pub fn new(coherence: f64, quality: f64, fluency: f64) -> Self {
        Self {
            coherence: clamp_score(coherence),
            quality: clamp_score(quality),
            fluency: clamp_score(fluency),
        }
    }

    pub fn get(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Coherence => self.coherence,
            ScoreDimension::Quality => self.quality,
            ScoreDimension::Fluency => self.fluency,
        }
    }

    /// 加权总分
    pub fn aggregate(&self, weights: &ScoreWeights) -> f64 {
        let total: f64 = ScoreDimension::ALL
            .iter()
            .map(|d| self.get(*d) * weights.weight(*d))
            .sum();
        clamp_score(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(12.0), 10.0);
        assert_eq!(clamp_score(0.2), 1.0);
        assert_eq!(clamp_score(7.5), 7.5);
    }

    #[test]
    fn test_aggregate_bounds_and_example() {
        let weights = ScoreWeights::default();
        assert!(approx(CriticScores::new(10.0, 10.0, 10.0).aggregate(&weights), 10.0));
        assert!(approx(CriticScores::new(1.0, 1.0, 1.0).aggregate(&weights), 1.0));
        assert!(approx(CriticScores::new(8.0, 6.0, 5.0).aggregate(&weights), 6.5));
    }

    #[test]
    fn test_critic_scores_are_clamped() {
        let scores = CriticScores::new(15.0, 0.0, 5.0);
        assert_eq!(scores.coherence, 10.0);
        assert_eq!(scores.quality, 1.0);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        assert!(ScoreWeights::new(0.4, 0.3, 0.3).is_ok());
        assert!(ScoreWeights::new(0.5, 0.3, 0.3).is_err());
        assert!(ScoreWeights::new(1.2, -0.1, -0.1).is_err());
    }

    #[test]
    fn test_dimension_labels() {
        let labels: Vec<&str> = ScoreDimension::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(labels, vec!["连贯性", "内容质量", "表达流畅度"]);
    }
}
