use chrono::Utc;

use crate::error::AppError;
use crate::model::MatchId;
use crate::schema::SubmitMatchSchema;
use crate::store::MatchStore;

/// Validate and persist a match result, returning the new record id.
///
/// With `guard_duplicates` set, a session that already has a record is
/// rejected and nothing is written.
pub async fn submit_match(
    store: &dyn MatchStore,
    candidate: SubmitMatchSchema,
    guard_duplicates: bool,
) -> Result<MatchId, AppError> {
    let record = candidate.into_new_match(Utc::now()).map_err(|missing| {
        AppError::Validation(format!("Missing required fields: {}", missing.join(", ")))
    })?;

    let is_player = |name: &str| name == record.player1 || name == record.player2;
    if !is_player(&record.winner) || !is_player(&record.loser) {
        tracing::warn!(
            session_id = %record.session_id,
            winner = %record.winner,
            loser = %record.loser,
            "winner or loser is not one of the players"
        );
    }

    let session_id = record.session_id.clone();
    let id = if guard_duplicates {
        store
            .insert_if_session_absent(record)
            .await
            .map_err(AppError::StoreWrite)?
            .ok_or(AppError::DuplicateSession(session_id.clone()))?
    } else {
        store.insert(record).await.map_err(AppError::StoreWrite)?
    };

    tracing::info!(%id, session_id = %session_id, "match saved");
    Ok(id)
}
