//! Document store access for match records.

mod memory;
mod postgres;

pub use memory::MemoryMatchStore;
pub use postgres::PgMatchStore;

use anyhow::Result;
use async_trait::async_trait;
use crate::model::{MatchId, MatchModel, NewMatch};

/// Which records a query should return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub session_id: Option<String>,
}

impl MatchFilter {
    pub fn session(session_id: Option<String>) -> Self {
        Self { session_id }
    }

    pub fn matches(&self, m: &MatchModel) -> bool {
        match &self.session_id {
            Some(s) => m.session_id.as_deref() == Some(s.as_str()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    CreatedAtDesc,
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Fetch the records matching `filter`. With `order` set the store sorts
    /// server side, which may fail if it lacks a suitable index.
    async fn query(&self, filter: &MatchFilter, order: Option<SortOrder>)
        -> Result<Vec<MatchModel>>;

    /// Persist `record` and return its new id.
    async fn insert(&self, record: NewMatch) -> Result<MatchId>;

    /// Persist `record` only if no record shares its session id. Returns
    /// `None` when one already exists. Check and insert happen atomically.
    async fn insert_if_session_absent(&self, record: NewMatch) -> Result<Option<MatchId>>;
}
