use serde::{Deserialize, Serialize};

/// Body of `POST /commands/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}
