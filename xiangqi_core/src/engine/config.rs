use crate::logic::board::PieceType;
use crate::logic::eval_constants::{
    CHECK_BONUS, MATE_SCORE, VAL_ADVISOR, VAL_CANNON, VAL_CHARIOT, VAL_ELEPHANT, VAL_GENERAL,
    VAL_HORSE, VAL_SOLDIER,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_general: i32,
    pub val_advisor: i32,
    pub val_elephant: i32,
    pub val_horse: i32,
    pub val_chariot: i32,
    pub val_cannon: i32,
    pub val_soldier: i32,
    pub check_bonus: i32,

    // Search Parameters
    pub mate_score: i32,
    pub min_depth: u8,
    pub max_depth: u8,
    pub default_depth: u8,
    /// Score a side with no legal move and no check as lost rather than 0.
    pub stalemate_is_loss: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_general: VAL_GENERAL,
            val_advisor: VAL_ADVISOR,
            val_elephant: VAL_ELEPHANT,
            val_horse: VAL_HORSE,
            val_chariot: VAL_CHARIOT,
            val_cannon: VAL_CANNON,
            val_soldier: VAL_SOLDIER,
            check_bonus: CHECK_BONUS,

            mate_score: MATE_SCORE,
            min_depth: 1,
            max_depth: 5,
            default_depth: 3,
            stalemate_is_loss: true,
        }
    }
}

/// Relative form accepted by `load_from_json`: piece values are scale
/// factors on the defaults, everything else is absolute.
#[derive(Deserialize)]
struct EngineConfigJson {
    val_general: Option<f32>,
    val_advisor: Option<f32>,
    val_elephant: Option<f32>,
    val_horse: Option<f32>,
    val_chariot: Option<f32>,
    val_cannon: Option<f32>,
    val_soldier: Option<f32>,
    check_bonus: Option<f32>,

    mate_score: Option<i32>,
    min_depth: Option<u8>,
    max_depth: Option<u8>,
    default_depth: Option<u8>,
    stalemate_is_loss: Option<bool>,
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_general: apply_scale(default.val_general, json_config.val_general),
            val_advisor: apply_scale(default.val_advisor, json_config.val_advisor),
            val_elephant: apply_scale(default.val_elephant, json_config.val_elephant),
            val_horse: apply_scale(default.val_horse, json_config.val_horse),
            val_chariot: apply_scale(default.val_chariot, json_config.val_chariot),
            val_cannon: apply_scale(default.val_cannon, json_config.val_cannon),
            val_soldier: apply_scale(default.val_soldier, json_config.val_soldier),
            check_bonus: apply_scale(default.check_bonus, json_config.check_bonus),

            mate_score: json_config.mate_score.unwrap_or(default.mate_score),
            min_depth: json_config.min_depth.unwrap_or(default.min_depth),
            max_depth: json_config.max_depth.unwrap_or(default.max_depth),
            default_depth: json_config.default_depth.unwrap_or(default.default_depth),
            stalemate_is_loss: json_config
                .stalemate_is_loss
                .unwrap_or(default.stalemate_is_loss),
        })
    }

    pub const fn piece_value(&self, piece_type: PieceType) -> i32 {
        match piece_type {
            PieceType::General => self.val_general,
            PieceType::Advisor => self.val_advisor,
            PieceType::Elephant => self.val_elephant,
            PieceType::Horse => self.val_horse,
            PieceType::Chariot => self.val_chariot,
            PieceType::Cannon => self.val_cannon,
            PieceType::Soldier => self.val_soldier,
        }
    }

    /// Difficulty knob: pins `depth` into `[min_depth, max_depth]`, never below 1.
    pub fn clamp_depth(&self, depth: u8) -> u8 {
        let low = self.min_depth.min(self.max_depth).max(1);
        let high = self.max_depth.max(low);
        depth.clamp(low, high)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
