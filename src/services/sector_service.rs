use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::models::{NewSector, Sector, SectorInput};
use crate::database::{DatabaseError, StoreRepository};

#[derive(Debug, Error)]
pub enum SectorError {
    #[error("Store {0} not found")]
    StoreNotFound(i64),

    #[error("Sector {0} not found")]
    SectorNotFound(i64),

    #[error("Parent sector {0} does not exist")]
    ParentNotFound(i64),

    #[error("Parent sector {parent_id} belongs to another store than {store_id}")]
    ParentInOtherStore { parent_id: i64, store_id: i64 },

    #[error("Sector {sector_id} cannot be moved under {parent_id}, which is itself or one of its descendants")]
    InvalidMove { sector_id: i64, parent_id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Sector writes that keep `level` and the parent forest consistent.
pub struct SectorService {
    repo: Arc<dyn StoreRepository>,
}

impl SectorService {
    pub fn new(repo: Arc<dyn StoreRepository>) -> Self {
        Self { repo }
    }

    /// Flat list of a store's sectors, for editors
    pub async fn list(&self, store_id: i64) -> Result<Vec<Sector>, SectorError> {
        self.require_store(store_id).await?;
        Ok(self.repo.list_store_sectors(store_id).await?)
    }

    /// Create a sector; the level is derived from the parent, never taken from input.
    pub async fn create(&self, store_id: i64, input: SectorInput) -> Result<Sector, SectorError> {
        validate_name(&input.name)?;
        self.require_store(store_id).await?;

        let level = match input.parent_id {
            Some(parent_id) => self.resolve_parent(store_id, parent_id).await?.level + 1,
            None => 0,
        };

        let sector = self
            .repo
            .create_sector(&NewSector::from_input(store_id, level, input))
            .await?;
        info!("Created sector {} in store {} at level {}", sector.id, store_id, level);
        Ok(sector)
    }

    /// Replace a sector's attributes, possibly moving it under a new parent.
    ///
    /// The sector stays in its store. After a move the levels of the whole
    /// moved subtree are rewritten.
    pub async fn update(&self, id: i64, input: SectorInput) -> Result<Sector, SectorError> {
        validate_name(&input.name)?;
        let existing = self
            .repo
            .get_sector(id)
            .await?
            .ok_or(SectorError::SectorNotFound(id))?;
        let store_id = existing.store_id;

        let level = match input.parent_id {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(SectorError::InvalidMove { sector_id: id, parent_id });
                }
                let parent = self.resolve_parent(store_id, parent_id).await?;
                self.reject_descendant_parent(id, &parent).await?;
                parent.level + 1
            }
            None => 0,
        };

        let updated = self
            .repo
            .update_sector(id, &NewSector::from_input(store_id, level, input))
            .await?;

        if existing.parent_id != updated.parent_id || existing.level != updated.level {
            let rewritten = self.recompute_levels(&updated).await?;
            info!(
                "Moved sector {} under {:?}; rewrote {} descendant levels",
                id, updated.parent_id, rewritten
            );
        }
        Ok(updated)
    }

    /// Delete a sector together with its subtree and their products
    pub async fn delete(&self, id: i64) -> Result<(), SectorError> {
        match self.repo.delete_sector(id).await {
            Err(DatabaseError::NotFound(_)) => Err(SectorError::SectorNotFound(id)),
            other => Ok(other?),
        }
    }

    async fn require_store(&self, store_id: i64) -> Result<(), SectorError> {
        match self.repo.get_store(store_id).await? {
            Some(_) => Ok(()),
            None => Err(SectorError::StoreNotFound(store_id)),
        }
    }

    async fn resolve_parent(&self, store_id: i64, parent_id: i64) -> Result<Sector, SectorError> {
        let parent = self
            .repo
            .get_sector(parent_id)
            .await?
            .ok_or(SectorError::ParentNotFound(parent_id))?;
        if parent.store_id != store_id {
            return Err(SectorError::ParentInOtherStore { parent_id, store_id });
        }
        Ok(parent)
    }

    /// Walk up from the proposed parent; meeting `id` means the move would close a loop.
    async fn reject_descendant_parent(&self, id: i64, parent: &Sector) -> Result<(), SectorError> {
        let mut seen = HashSet::new();
        let mut current = parent.parent_id;
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(SectorError::InvalidMove { sector_id: id, parent_id: parent.id });
            }
            if !seen.insert(ancestor) {
                break;
            }
            current = match self.repo.get_sector(ancestor).await? {
                Some(sector) => sector.parent_id,
                None => None,
            };
        }
        Ok(())
    }

    /// Rewrite levels below `root` so each child sits one below its parent.
    /// Returns how many rows changed.
    async fn recompute_levels(&self, root: &Sector) -> Result<usize, SectorError> {
        let mut changed = 0;
        let mut seen = HashSet::from([root.id]);
        let mut stack = vec![(root.id, root.level)];
        while let Some((parent_id, parent_level)) = stack.pop() {
            for child in self.repo.find_sectors(root.store_id, Some(parent_id)).await? {
                if !seen.insert(child.id) {
                    continue;
                }
                let level = parent_level + 1;
                if child.level != level {
                    debug!("Sector {} level {} -> {}", child.id, child.level, level);
                    self.repo.set_sector_level(child.id, level).await?;
                    changed += 1;
                }
                stack.push((child.id, level));
            }
        }
        Ok(changed)
    }
}

fn validate_name(name: &str) -> Result<(), SectorError> {
    if name.trim().is_empty() {
        return Err(SectorError::Validation("Sector name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::testing::seeded_store;

    fn input(name: &str, parent_id: Option<i64>) -> SectorInput {
        SectorInput {
            name: name.to_string(),
            description: String::new(),
            position_x: 0.0,
            position_y: 0.0,
            width: 2.0,
            height: 2.0,
            // ignored on write
            level: Some(42),
            parent_id,
        }
    }

    async fn setup() -> (SectorService, Arc<MemoryStore>, i64) {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Sectors").await;
        (SectorService::new(repo.clone()), repo, store)
    }

    #[tokio::test]
    async fn create_derives_level_from_parent() {
        let (service, _, store) = setup().await;
        let root = service.create(store, input("Dairy", None)).await.unwrap();
        let child = service.create(store, input("Milk", Some(root.id))).await.unwrap();
        let grandchild = service.create(store, input("Cream", Some(child.id))).await.unwrap();

        assert_eq!(root.level, 0);
        assert_eq!(child.level, 1);
        assert_eq!(grandchild.level, 2);
    }

    #[tokio::test]
    async fn create_rejects_foreign_or_missing_parent() {
        let (service, repo, store) = setup().await;
        let other = seeded_store(&repo, "Other").await;
        let foreign = service.create(other, input("Foreign", None)).await.unwrap();

        assert!(matches!(
            service.create(store, input("X", Some(foreign.id))).await,
            Err(SectorError::ParentInOtherStore { .. })
        ));
        assert!(matches!(
            service.create(store, input("X", Some(777))).await,
            Err(SectorError::ParentNotFound(777))
        ));
        assert!(matches!(
            service.create(999, input("X", None)).await,
            Err(SectorError::StoreNotFound(999))
        ));
        assert!(matches!(
            service.create(store, input("   ", None)).await,
            Err(SectorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn moving_under_own_descendant_is_rejected() {
        let (service, _, store) = setup().await;
        let a = service.create(store, input("A", None)).await.unwrap();
        let b = service.create(store, input("B", Some(a.id))).await.unwrap();
        let c = service.create(store, input("C", Some(b.id))).await.unwrap();

        assert!(matches!(
            service.update(a.id, input("A", Some(c.id))).await,
            Err(SectorError::InvalidMove { sector_id, parent_id }) if sector_id == a.id && parent_id == c.id
        ));
        assert!(matches!(
            service.update(a.id, input("A", Some(a.id))).await,
            Err(SectorError::InvalidMove { .. })
        ));
    }

    #[tokio::test]
    async fn move_rewrites_subtree_levels() {
        let (service, repo, store) = setup().await;
        let a = service.create(store, input("A", None)).await.unwrap();
        let b = service.create(store, input("B", None)).await.unwrap();
        let c = service.create(store, input("C", Some(b.id))).await.unwrap();

        let moved = service.update(b.id, input("B", Some(a.id))).await.unwrap();
        assert_eq!(moved.level, 1);
        assert_eq!(repo.get_sector(c.id).await.unwrap().unwrap().level, 2);

        // and back to the top
        service.update(b.id, input("B", None)).await.unwrap();
        assert_eq!(repo.get_sector(b.id).await.unwrap().unwrap().level, 0);
        assert_eq!(repo.get_sector(c.id).await.unwrap().unwrap().level, 1);
    }

    #[tokio::test]
    async fn delete_missing_sector_is_not_found() {
        let (service, _, _) = setup().await;
        assert!(matches!(service.delete(5).await, Err(SectorError::SectorNotFound(5))));
    }
}
