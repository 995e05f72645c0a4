use serde::{Deserialize, Serialize};

/// Request body for creating a court
#[derive(Debug, Default, Deserialize)]
pub struct CreateCourtRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Count of rows removed by a bulk clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub removed: u64,
}
