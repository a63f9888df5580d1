use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::info;

use crate::database::models::{MapElementInput, MapSettings, NewSector, ProductInput, StoreInput, WallInput};
use crate::database::{DatabaseError, StoreRepository};

/// Demo supermarket bundled with the binary
pub const DEMO_STORE_YAML: &str = include_str!("../../fixtures/demo_store.yaml");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid fixture: {0}")]
    Fixture(#[from] serde_yaml::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A whole store layout as written in a YAML fixture.
#[derive(Debug, Deserialize)]
pub struct StoreFixture {
    pub store: StoreInput,
    #[serde(default)]
    pub map_config: Option<MapSettings>,
    #[serde(default)]
    pub walls: Vec<WallInput>,
    #[serde(default)]
    pub sectors: Vec<SectorFixture>,
    #[serde(default)]
    pub map_elements: Vec<MapElementInput>,
}

#[derive(Debug, Deserialize)]
pub struct SectorFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub products: Vec<ProductInput>,
    #[serde(default)]
    pub sub_sectors: Vec<SectorFixture>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub store_id: i64,
    pub sectors: usize,
    pub products: usize,
    pub walls: usize,
    pub map_elements: usize,
}

impl StoreFixture {
    pub fn from_yaml(source: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn demo() -> Result<Self, SeedError> {
        Self::from_yaml(DEMO_STORE_YAML)
    }

    /// Insert the fixture as a new store
    pub async fn load(&self, repo: &dyn StoreRepository) -> Result<SeedSummary, SeedError> {
        let store = repo.create_store(&self.store).await?;
        let mut summary = SeedSummary {
            store_id: store.id,
            ..SeedSummary::default()
        };

        // breadth-first so siblings get ascending ids in fixture order
        let mut pending: VecDeque<(&SectorFixture, Option<i64>, i32)> =
            self.sectors.iter().map(|s| (s, None, 0)).collect();
        while let Some((fixture, parent_id, level)) = pending.pop_front() {
            let sector = repo
                .create_sector(&NewSector {
                    store_id: store.id,
                    name: fixture.name.clone(),
                    description: fixture.description.clone(),
                    position_x: fixture.position_x,
                    position_y: fixture.position_y,
                    width: fixture.width,
                    height: fixture.height,
                    level,
                    parent_id,
                })
                .await?;
            summary.sectors += 1;
            for product in &fixture.products {
                repo.create_product(sector.id, product).await?;
                summary.products += 1;
            }
            pending.extend(fixture.sub_sectors.iter().map(|s| (s, Some(sector.id), level + 1)));
        }

        for wall in &self.walls {
            repo.create_wall(store.id, wall).await?;
            summary.walls += 1;
        }
        for element in &self.map_elements {
            repo.create_map_element(store.id, element).await?;
            summary.map_elements += 1;
        }
        if let Some(settings) = &self.map_config {
            repo.upsert_map_config(store.id, settings).await?;
        }

        info!(
            "Seeded store '{}' (id {}): {} sectors, {} products",
            store.name, store.id, summary.sectors, summary.products
        );
        Ok(summary)
    }
}

/// Load the demo store unless any store already exists
pub async fn seed_demo_data(repo: &dyn StoreRepository) -> Result<Option<SeedSummary>, SeedError> {
    if repo.count_stores().await? > 0 {
        info!("Stores already present; skipping demo seed");
        return Ok(None);
    }
    let summary = StoreFixture::demo()?.load(repo).await?;
    Ok(Some(summary))
}
