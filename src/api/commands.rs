//! Bot command endpoints

use axum::extract::State;

use super::middleware::RequireAdmin;
use super::state::AppState;
use super::types::{AskRequest, Json};
use crate::domain::bot::CommandReply;

/// `POST /commands/ask`
///
/// Always answers 200 with a reply; failures are expressed in the reply text.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Json<CommandReply> {
    Json(state.bot.ask(&request.question).await)
}

/// `POST /commands/refresh` (admin only)
pub async fn refresh(_admin: RequireAdmin, State(state): State<AppState>) -> Json<CommandReply> {
    Json(state.bot.refresh().await)
}
