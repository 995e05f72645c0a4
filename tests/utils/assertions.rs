//! Test assertion helpers - fluent API for verifying court state
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use courtqueue::CourtId;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct CourtAssertion {
    court_id: CourtId,
    state: Value,
}

impl CourtAssertion {
    /// Fetches the court through the API and checks queue positions are 1..=n
    pub async fn for_court(setup: &TestSetup, court_id: CourtId) -> Self {
        let state = setup.court_state(court_id).await;
        let positions: Vec<u64> = state["queue"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["position"].as_u64().unwrap())
            .collect();
        let expected: Vec<u64> = (1..=positions.len() as u64).collect();
        assert_eq!(
            positions, expected,
            "court {} positions should be contiguous",
            court_id
        );
        Self { court_id, state }
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.state["queue"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn has_queue(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.queue_names(),
            expected,
            "court {} has wrong queue",
            self.court_id
        );
        self
    }

    /// Asserts both sides as `(name, matches_played)`, `None` for an empty side
    pub fn has_match(self, team_a: Option<(&str, u64)>, team_b: Option<(&str, u64)>) -> Self {
        let active = &self.state["active_match"];
        assert!(
            !active.is_null(),
            "court {} should have an active match",
            self.court_id
        );
        for (side, expected) in [("team_a", team_a), ("team_b", team_b)] {
            let actual = &active[side];
            match expected {
                Some((name, played)) => {
                    assert_eq!(actual["name"], name, "{} name on court {}", side, self.court_id);
                    assert_eq!(
                        actual["matches_played"], played,
                        "{} streak on court {}",
                        side, self.court_id
                    );
                }
                None => {
                    assert!(actual["name"].is_null(), "{} should be empty", side);
                    assert_eq!(actual["matches_played"], 0);
                }
            }
        }
        self
    }

    pub fn has_no_match(self) -> Self {
        assert!(
            self.state["active_match"].is_null(),
            "court {} should have no active match",
            self.court_id
        );
        self
    }

    /// Every queued and playing name, sorted
    pub fn everyone(&self) -> Vec<String> {
        let mut names = self.queue_names();
        let active = &self.state["active_match"];
        for side in ["team_a", "team_b"] {
            if let Some(name) = active[side]["name"].as_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        names
    }
}
