use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;

use crate::shared::CourtId;

/// One of the two sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::A => "A",
                Side::B => "B",
            }
        )
    }
}

/// Occupant of one side of the court
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideState {
    /// `None` while the side waits to be filled from the queue
    pub name: Option<String>,
    pub matches_played: u32,
}

impl SideState {
    pub fn occupied(name: impl Into<String>, matches_played: u32) -> Self {
        Self {
            name: Some(name.into()),
            matches_played,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// The single active match of a court
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub court_id: CourtId,
    pub team_a: SideState,
    pub team_b: SideState,
    pub started_at: DateTime<Utc>,
}

impl Match {
    pub fn side(&self, side: Side) -> &SideState {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    /// Both sides have an occupant
    pub fn is_complete(&self) -> bool {
        !self.team_a.is_empty() && !self.team_b.is_empty()
    }

    pub fn occupied_names(&self) -> Vec<&str> {
        [&self.team_a, &self.team_b]
            .into_iter()
            .filter_map(|s| s.name.as_deref())
            .collect()
    }
}

/// Manual correction of a side's win streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountAdjustment {
    Increment,
    Decrement,
}

impl CountAdjustment {
    pub fn delta(&self) -> i64 {
        match self {
            CountAdjustment::Increment => 1,
            CountAdjustment::Decrement => -1,
        }
    }
}
