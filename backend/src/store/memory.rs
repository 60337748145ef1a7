use std::cmp::Reverse;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MatchFilter, MatchStore, SortOrder};
use crate::model::{MatchId, MatchModel, NewMatch};

/// In-process document store, kept in insertion order.
///
/// With `composite_index` disabled, a query that both filters and orders
/// fails the way a hosted document database does when the matching index has
/// not been built yet.
#[derive(Debug)]
pub struct MemoryMatchStore {
    docs: RwLock<Vec<MatchModel>>,
    composite_index: bool,
}

impl Default for MemoryMatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            composite_index: true,
        }
    }

    pub fn without_composite_index() -> Self {
        Self {
            composite_index: false,
            ..Self::new()
        }
    }

    pub fn with_documents(docs: Vec<MatchModel>) -> Self {
        Self {
            docs: RwLock::new(docs),
            composite_index: true,
        }
    }

    pub fn composite_index(mut self, enabled: bool) -> Self {
        self.composite_index = enabled;
        self
    }

    /// Load documents from a JSON array file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Unable to read seed file {}", path.display()))?;
        let docs: Vec<MatchModel> = serde_json::from_str(&raw)
            .with_context(|| format!("Unable to parse seed file {}", path.display()))?;
        tracing::info!(count = docs.len(), path = %path.display(), "seeded memory store");
        Ok(Self::with_documents(docs))
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn query(
        &self,
        filter: &MatchFilter,
        order: Option<SortOrder>,
    ) -> Result<Vec<MatchModel>> {
        if order.is_some() && filter.session_id.is_some() && !self.composite_index {
            return Err(anyhow!(
                "The query requires an index on (sessionId, createdAt desc)"
            ));
        }

        let mut found: Vec<MatchModel> = self
            .docs
            .read()
            .await
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();

        if let Some(SortOrder::CreatedAtDesc) = order {
            found.sort_by_key(|m| Reverse(m.created_at));
        }

        Ok(found)
    }

    async fn insert(&self, record: NewMatch) -> Result<MatchId> {
        let id = MatchId::generate();
        self.docs.write().await.push(record.into_model(id.clone()));
        Ok(id)
    }

    async fn insert_if_session_absent(&self, record: NewMatch) -> Result<Option<MatchId>> {
        let mut docs = self.docs.write().await;
        if docs
            .iter()
            .any(|m| m.session_id.as_deref() == Some(record.session_id.as_str()))
        {
            return Ok(None);
        }

        let id = MatchId::generate();
        docs.push(record.into_model(id.clone()));
        Ok(Some(id))
    }
}
