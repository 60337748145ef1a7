use std::cmp::Reverse;

use crate::error::AppError;
use crate::schema::LeaderboardEntry;
use crate::store::{MatchFilter, MatchStore, SortOrder};

/// List matches newest first, optionally restricted to one session.
///
/// The store is asked to sort. If it cannot (typically a missing index),
/// the same filter is fetched unordered and sorted here instead.
pub async fn list_matches(
    store: &dyn MatchStore,
    session_id: Option<String>,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let filter = MatchFilter::session(session_id);

    let matches = match store.query(&filter, Some(SortOrder::CreatedAtDesc)).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(
                session_id = ?filter.session_id,
                "ordered query failed, sorting in memory: {:#}",
                e
            );
            let mut matches = store.query(&filter, None).await.map_err(AppError::Query)?;
            // Stable; records without a timestamp tie with each other and go last.
            matches.sort_by_key(|m| Reverse(m.created_at));
            matches
        }
    };

    tracing::debug!(session_id = ?filter.session_id, count = matches.len(), "listed matches");

    Ok(matches.into_iter().map(LeaderboardEntry::from).collect())
}
