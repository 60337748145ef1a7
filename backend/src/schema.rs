use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{MatchId, MatchModel, NewMatch};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub session_id: Option<String>,
}

/// Body of a match submission. Every field is optional here so that
/// validation can report all missing fields at once.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMatchSchema {
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub session_id: Option<String>,
    pub match_time: Option<Value>,
}

impl SubmitMatchSchema {
    /// Names of required fields that are absent, null or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let text = [
            ("winner", &self.winner),
            ("loser", &self.loser),
            ("player1", &self.player1),
            ("player2", &self.player2),
            ("sessionId", &self.session_id),
        ];
        let mut missing: Vec<&'static str> = text
            .into_iter()
            .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
            .map(|(name, _)| name)
            .collect();

        if matches!(self.match_time, None | Some(Value::Null)) {
            missing.push("matchTime");
        }
        missing
    }

    /// Build the record to insert, stamped with `created_at`. Returns the
    /// missing field names if the submission is incomplete.
    pub fn into_new_match(self, created_at: DateTime<Utc>) -> Result<NewMatch, Vec<&'static str>> {
        let missing = self.missing_fields();
        match self {
            SubmitMatchSchema {
                winner: Some(winner),
                loser: Some(loser),
                player1: Some(player1),
                player2: Some(player2),
                session_id: Some(session_id),
                match_time: Some(match_time),
            } if missing.is_empty() => Ok(NewMatch {
                player1,
                player2,
                winner,
                loser,
                session_id,
                match_time,
                created_at,
            }),
            _ => Err(missing),
        }
    }
}

/// Public shape of a leaderboard row. Timestamps are internal and never sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: MatchId,
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub winner: String,
    pub loser: String,
    pub match_time: Option<Value>,
}

impl From<MatchModel> for LeaderboardEntry {
    fn from(m: MatchModel) -> Self {
        Self {
            id: m.id,
            player1: m.player1,
            player2: m.player2,
            winner: m.winner,
            loser: m.loser,
            match_time: m.match_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubmitMatchResponse {
    pub message: String,
    pub id: MatchId,
}
