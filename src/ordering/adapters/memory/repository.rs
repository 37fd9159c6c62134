//! In-memory ordered repository used by tests and embedded hosts.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ordering::{
    domain::{ContainerId, ItemId, OrderedItem, Rank, RankUpdate},
    ports::{OrderedRepository, OrderedRepositoryError, OrderedRepositoryResult},
};

/// Thread-safe in-memory ordered repository.
///
/// Items are kept in an id-indexed arena; containers are plain identifiers.
/// Every method takes the lock once, so each call is individually atomic
/// while sequences of calls are not.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderedRepository {
    state: Arc<RwLock<InMemoryOrderedState>>,
}

#[derive(Debug, Default)]
struct InMemoryOrderedState {
    items: HashMap<ItemId, OrderedItem>,
    containers: HashSet<ContainerId>,
    write_batches: usize,
}

impl InMemoryOrderedRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of `batch_update_ranks` calls applied so far.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn write_batches(&self) -> OrderedRepositoryResult<usize> {
        Ok(self.read()?.write_batches)
    }

    fn read(&self) -> OrderedRepositoryResult<RwLockReadGuard<'_, InMemoryOrderedState>> {
        self.state.read().map_err(|err| {
            OrderedRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> OrderedRepositoryResult<RwLockWriteGuard<'_, InMemoryOrderedState>> {
        self.state.write().map_err(|err| {
            OrderedRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn items_in(state: &InMemoryOrderedState, container_id: ContainerId) -> Vec<OrderedItem> {
    let mut items: Vec<OrderedItem> = state
        .items
        .values()
        .filter(|item| item.container_id() == container_id)
        .cloned()
        .collect();
    items.sort_by(|left, right| {
        left.rank()
            .cmp(&right.rank())
            .then_with(|| left.created_at().cmp(&right.created_at()))
            .then_with(|| left.id().cmp(&right.id()))
    });
    items
}

#[async_trait]
impl OrderedRepository for InMemoryOrderedRepository {
    async fn find_item(&self, id: ItemId) -> OrderedRepositoryResult<Option<OrderedItem>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn list_ordered(
        &self,
        container_id: ContainerId,
    ) -> OrderedRepositoryResult<Vec<OrderedItem>> {
        let state = self.read()?;
        Ok(items_in(&state, container_id))
    }

    async fn max_rank(&self, container_id: ContainerId) -> OrderedRepositoryResult<Option<Rank>> {
        let state = self.read()?;
        Ok(state
            .items
            .values()
            .filter(|item| item.container_id() == container_id)
            .map(OrderedItem::rank)
            .max())
    }

    async fn container_exists(&self, container_id: ContainerId) -> OrderedRepositoryResult<bool> {
        Ok(self.read()?.containers.contains(&container_id))
    }

    async fn open_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        self.write()?.containers.insert(container_id);
        Ok(())
    }

    async fn close_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        let mut state = self.write()?;
        state.containers.remove(&container_id);
        state
            .items
            .retain(|_, item| item.container_id() != container_id);
        Ok(())
    }

    async fn insert_item(&self, item: &OrderedItem) -> OrderedRepositoryResult<()> {
        let mut state = self.write()?;
        if state.items.contains_key(&item.id()) {
            return Err(OrderedRepositoryError::DuplicateItem(item.id()));
        }
        if !state.containers.contains(&item.container_id()) {
            return Err(OrderedRepositoryError::ContainerNotFound(
                item.container_id(),
            ));
        }
        state.items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn batch_update_ranks(&self, updates: &[RankUpdate]) -> OrderedRepositoryResult<()> {
        let mut state = self.write()?;
        // Validate first so a bad batch leaves the store untouched.
        if let Some(missing) = updates
            .iter()
            .find(|update| !state.items.contains_key(&update.item_id))
        {
            return Err(OrderedRepositoryError::ItemNotFound(missing.item_id));
        }
        if let Some(unknown) = updates
            .iter()
            .filter_map(|update| update.container_id)
            .find(|container_id| !state.containers.contains(container_id))
        {
            return Err(OrderedRepositoryError::ContainerNotFound(unknown));
        }

        for update in updates {
            if let Some(item) = state.items.get_mut(&update.item_id) {
                item.apply(update);
            }
        }
        state.write_batches = state.write_batches.saturating_add(1);
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> OrderedRepositoryResult<()> {
        self.write()?
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(OrderedRepositoryError::ItemNotFound(id))
    }
}
