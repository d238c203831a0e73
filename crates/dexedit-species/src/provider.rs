use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dexedit_core::StatBlock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::moves::LearnableMove;

/// Base attributes of a species, used to prefill a new record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: u32,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub base_stats: StatBlock,
    pub growth_rate: Option<String>,
    pub base_happiness: Option<i64>,
    pub base_experience: i64,
    /// Sorted with [`crate::moves::sort_moves`].
    pub moves: Vec<LearnableMove>,
}

#[async_trait]
pub trait SpeciesProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_species(&self, id: u32) -> Result<SpeciesData>;
}

// ─── Last request wins ────────────────────────────────────────────────────────

/// Issues tickets for lookups; only the most recently issued ticket is current.
#[derive(Debug, Clone, Default)]
pub struct LatestRequest {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn begin(&self) -> RequestTicket {
        let id = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        RequestTicket {
            id,
            generation: Arc::clone(&self.generation),
        }
    }
}

impl RequestTicket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.id
    }

    /// `Some(value)` if no later request was started.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }
}

/// Fetch `id` under `guard`. `Ok(None)` means a later lookup superseded this one.
pub async fn fetch_latest<P>(provider: &P, guard: &LatestRequest, id: u32) -> Result<Option<SpeciesData>>
where
    P: SpeciesProvider + ?Sized,
{
    let ticket = guard.begin();
    let data = provider.fetch_species(id).await?;
    Ok(ticket.accept(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ticket_supersedes_earlier() {
        let guard = LatestRequest::new();
        let first = guard.begin();
        assert!(first.is_current());

        let second = guard.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.accept(1), None);
        assert_eq!(second.accept(2), Some(2));
    }

    #[test]
    fn clones_share_generation() {
        let guard = LatestRequest::new();
        let ticket = guard.begin();
        guard.clone().begin();
        assert!(!ticket.is_current());
    }
}
