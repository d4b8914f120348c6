use serde::{Deserialize, Serialize};

fn default_session_limit() -> usize {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReviewConfig {
    /// Max due items pulled into one review session
    #[serde(default = "default_session_limit")]
    pub session_limit: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            session_limit: default_session_limit(),
        }
    }
}
