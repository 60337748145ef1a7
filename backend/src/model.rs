use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Document id. New records get a UUID, but ids written by earlier stores are
/// arbitrary strings, so the id is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted match result, as held by the store.
///
/// `player1`, `player2` and `session_id` are optional because the first
/// records ever written only carried `winner` and `loser`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchModel {
    pub id: MatchId,
    #[serde(default)]
    pub player1: Option<String>,
    #[serde(default)]
    pub player2: Option<String>,
    pub winner: String,
    pub loser: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub match_time: Option<Value>,
    #[serde(default, alias = "time", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A record about to be inserted; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub player1: String,
    pub player2: String,
    pub winner: String,
    pub loser: String,
    pub session_id: String,
    pub match_time: Value,
    pub created_at: DateTime<Utc>,
}

impl NewMatch {
    pub fn into_model(self, id: MatchId) -> MatchModel {
        MatchModel {
            id,
            player1: Some(self.player1),
            player2: Some(self.player2),
            winner: self.winner,
            loser: self.loser,
            session_id: Some(self.session_id),
            match_time: Some(self.match_time),
            created_at: Some(self.created_at),
        }
    }
}

// Accepts RFC 3339 strings, epoch milliseconds, and `{seconds, nanoseconds}`
// timestamp objects. Anything else reads as no timestamp.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))?
                .as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(created_at: Value) -> MatchModel {
        serde_json::from_value(json!({
            "id": "6f1c2a9e-51a4-4b43-9c55-0c7f3a1d2e10",
            "winner": "A",
            "loser": "B",
            "createdAt": created_at,
        }))
        .unwrap()
    }

    #[test]
    fn reads_rfc3339_created_at() {
        let m = doc(json!("2024-11-20T10:00:00Z"));
        assert_eq!(
            m.created_at,
            Some(
                DateTime::parse_from_rfc3339("2024-11-20T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc)
            )
        );
    }

    #[test]
    fn reads_timestamp_objects_and_millis() {
        let from_obj = doc(json!({ "seconds": 1_700_000_000, "nanoseconds": 0 }));
        let from_millis = doc(json!(1_700_000_000_000_i64));
        assert!(from_obj.created_at.is_some());
        assert_eq!(from_obj.created_at, from_millis.created_at);
    }

    #[test]
    fn unparseable_created_at_reads_as_none() {
        assert_eq!(doc(json!("yesterday")).created_at, None);
        assert_eq!(doc(json!(true)).created_at, None);
        assert_eq!(doc(Value::Null).created_at, None);
    }

    #[test]
    fn legacy_time_field_is_accepted() {
        let m: MatchModel = serde_json::from_value(json!({
            "id": "6f1c2a9e-51a4-4b43-9c55-0c7f3a1d2e10",
            "winner": "A",
            "loser": "B",
            "time": "2023-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(m.created_at.is_some());
        assert_eq!(m.player1, None);
        assert_eq!(m.session_id, None);
    }

    #[test]
    fn accepts_non_uuid_ids() {
        let m: MatchModel = serde_json::from_value(json!({
            "id": "Xk3p9QaBcD12",
            "winner": "A",
            "loser": "B",
            "time": { "_seconds": 1_700_000_000, "_nanoseconds": 0 },
        }))
        .unwrap();
        assert_eq!(m.id.as_str(), "Xk3p9QaBcD12");
        assert_eq!(m.created_at, DateTime::from_timestamp(1_700_000_000, 0));
    }

    #[test]
    fn generated_ids_serialize_as_plain_strings() {
        let id = MatchId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(id.as_str()));
    }
}
