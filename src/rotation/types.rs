use serde::{Deserialize, Serialize};

use super::models::{CountAdjustment, Match, Side};

#[derive(Debug, Default, Deserialize)]
pub struct EndMatchRequest {
    #[serde(default)]
    pub winner: Option<Side>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustCountRequest {
    pub side: Side,
    pub adjustment: CountAdjustment,
}

/// Result of ending a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndMatchResponse {
    pub winner: String,
    pub loser: String,
    pub winner_left: bool,
    pub active_match: Option<Match>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustCountResponse {
    pub side: Side,
    pub matches_played: u32,
}
