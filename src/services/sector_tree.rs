use futures::future::BoxFuture;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::models::{Product, Sector};
use crate::database::{DatabaseError, SectorSource, StoreRepository};

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Sector hierarchy contains a cycle through sector {sector_id}")]
    CycleDetected { sector_id: i64 },

    #[error("Sector {sector_id} is nested deeper than {max_depth} levels")]
    DepthExceeded { sector_id: i64, max_depth: usize },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductNode {
    pub id: i64,
    pub sector_id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<Product> for ProductNode {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            sector_id: product.sector_id,
            name: product.name,
            description: product.description,
            price: product.price,
        }
    }
}

/// One sector with its products and nested children, as sent to map renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorNode {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub description: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    /// Depth below the root, computed during assembly
    pub level: i32,
    pub parent_id: Option<i64>,
    pub products: Vec<ProductNode>,
    pub sub_sectors: Vec<SectorNode>,
}

impl SectorNode {
    fn new(sector: Sector, level: i32, products: Vec<ProductNode>, sub_sectors: Vec<SectorNode>) -> Self {
        Self {
            id: sector.id,
            store_id: sector.store_id,
            name: sector.name,
            description: sector.description,
            position_x: sector.position_x,
            position_y: sector.position_y,
            width: sector.width,
            height: sector.height,
            level,
            parent_id: sector.parent_id,
            products,
            sub_sectors,
        }
    }

    /// Number of sectors in this subtree, including self
    pub fn sector_count(&self) -> usize {
        1 + self.sub_sectors.iter().map(SectorNode::sector_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelMismatch {
    pub sector_id: i64,
    pub stored: i32,
    pub computed: i32,
}

/// Result of a flat scan over a store's sector rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyReport {
    pub store_id: i64,
    pub sector_count: usize,
    /// Each cycle listed from its smallest sector id, following parent links
    pub cycles: Vec<Vec<i64>>,
    /// Sectors whose parent id points at no sector of this store
    pub orphans: Vec<i64>,
    pub level_mismatches: Vec<LevelMismatch>,
}

impl HierarchyReport {
    pub fn is_consistent(&self) -> bool {
        self.cycles.is_empty() && self.orphans.is_empty() && self.level_mismatches.is_empty()
    }
}

/// Per-build bookkeeping for the cycle guard
#[derive(Default)]
struct Walk {
    path: HashSet<i64>,
    visited: HashSet<i64>,
}

/// Builds a store's sector forest from flat repository rows.
///
/// Depth-first, one children query and one products query per sector.
/// The first repository error aborts the build; no partial tree is returned.
pub struct SectorTreeAssembler<R: ?Sized = dyn StoreRepository> {
    repo: Arc<R>,
    max_depth: usize,
}

impl<R: SectorSource + ?Sized> SectorTreeAssembler<R> {
    pub fn new(repo: Arc<R>, max_depth: usize) -> Self {
        Self { repo, max_depth }
    }

    /// Root sectors of `store_id` with their full subtrees.
    ///
    /// Does not check that the store exists; an unknown store yields an
    /// empty forest.
    pub async fn build_sector_tree(&self, store_id: i64) -> Result<Vec<SectorNode>, TreeError> {
        let roots = self.repo.find_sectors(store_id, None).await?;
        let mut walk = Walk::default();
        let mut forest = Vec::with_capacity(roots.len());
        for root in roots {
            forest.push(self.build_node(root, 0, &mut walk).await?);
        }

        // Sectors that no root reaches are either orphans or sit on a
        // parent cycle; only the latter is fatal.
        let total = self.repo.count_sectors(store_id).await?;
        if (walk.visited.len() as i64) < total {
            let report = self.audit(store_id).await?;
            if let Some(cycle) = report.cycles.first() {
                let sector_id = cycle.first().copied().unwrap_or_default();
                warn!("Store {} has a sector cycle {:?}", store_id, cycle);
                return Err(TreeError::CycleDetected { sector_id });
            }
            if !report.orphans.is_empty() {
                warn!(
                    "Store {} has sectors with dangling parents, left out of the tree: {:?}",
                    store_id, report.orphans
                );
            }
        }

        Ok(forest)
    }

    fn build_node<'a>(
        &'a self,
        sector: Sector,
        depth: usize,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, Result<SectorNode, TreeError>> {
        Box::pin(async move {
            let sector_id = sector.id;
            if depth >= self.max_depth {
                return Err(TreeError::DepthExceeded { sector_id, max_depth: self.max_depth });
            }
            if walk.path.contains(&sector_id) || !walk.visited.insert(sector_id) {
                return Err(TreeError::CycleDetected { sector_id });
            }
            walk.path.insert(sector_id);

            let children = self.repo.find_sectors(sector.store_id, Some(sector_id)).await?;
            let products: Vec<ProductNode> = self
                .repo
                .find_products(sector_id)
                .await?
                .into_iter()
                .map(ProductNode::from)
                .collect();

            let mut sub_sectors = Vec::with_capacity(children.len());
            for child in children {
                sub_sectors.push(self.build_node(child, depth + 1, walk).await?);
            }

            walk.path.remove(&sector_id);

            let level = depth as i32;
            if sector.level != level {
                warn!(
                    "Sector {} stores level {} but sits at depth {}",
                    sector_id, sector.level, level
                );
            }
            debug!(
                "Assembled sector {} ({} products, {} children)",
                sector_id,
                products.len(),
                sub_sectors.len()
            );
            Ok(SectorNode::new(sector, level, products, sub_sectors))
        })
    }

    /// Flat consistency check over every sector row of the store
    pub async fn audit(&self, store_id: i64) -> Result<HierarchyReport, TreeError> {
        let sectors = self.repo.list_store_sectors(store_id).await?;
        Ok(analyze_hierarchy(store_id, &sectors))
    }
}

/// Detects cycles, dangling parents and stale levels in a flat sector list.
pub fn analyze_hierarchy(store_id: i64, sectors: &[Sector]) -> HierarchyReport {
    let by_id: BTreeMap<i64, &Sector> = sectors.iter().map(|s| (s.id, s)).collect();

    let orphans: Vec<i64> = sectors
        .iter()
        .filter(|s| s.parent_id.is_some_and(|p| !by_id.contains_key(&p)))
        .map(|s| s.id)
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Active,
        Done,
    }

    // Follow parent links from every sector; reaching a sector that is
    // still on the current chain closes a cycle.
    let mut marks: HashMap<i64, Mark> = HashMap::new();
    let mut cycles = Vec::new();
    for start in by_id.keys().copied() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            match marks.get(&id) {
                Some(Mark::Done) => break,
                Some(Mark::Active) => {
                    if let Some(pos) = chain.iter().position(|&c| c == id) {
                        let mut cycle: Vec<i64> = chain[pos..].to_vec();
                        if let Some(min_pos) = cycle.iter().enumerate().min_by_key(|(_, id)| **id).map(|(i, _)| i) {
                            cycle.rotate_left(min_pos);
                        }
                        cycles.push(cycle);
                    }
                    break;
                }
                None => {
                    marks.insert(id, Mark::Active);
                    chain.push(id);
                    current = by_id.get(&id).and_then(|s| s.parent_id).filter(|p| by_id.contains_key(p));
                }
            }
        }
        for id in chain {
            marks.insert(id, Mark::Done);
        }
    }

    let mut children: BTreeMap<i64, Vec<&Sector>> = BTreeMap::new();
    for sector in sectors {
        if let Some(parent) = sector.parent_id {
            children.entry(parent).or_default().push(sector);
        }
    }
    let mut level_mismatches = Vec::new();
    let mut queue: Vec<(&Sector, i32)> = sectors
        .iter()
        .filter(|s| s.parent_id.is_none())
        .map(|s| (s, 0))
        .collect();
    while let Some((sector, depth)) = queue.pop() {
        if sector.level != depth {
            level_mismatches.push(LevelMismatch {
                sector_id: sector.id,
                stored: sector.level,
                computed: depth,
            });
        }
        if let Some(kids) = children.get(&sector.id) {
            queue.extend(kids.iter().map(|k| (*k, depth + 1)));
        }
    }
    level_mismatches.sort_by_key(|m| m.sector_id);

    HierarchyReport {
        store_id,
        sector_count: sectors.len(),
        cycles,
        orphans,
        level_mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, StoreRepository};
    use crate::testing::{product_input, raw_sector, sector_under, seeded_store, LoopingSource};
    use std::collections::BTreeSet;

    fn assembler(repo: Arc<MemoryStore>) -> SectorTreeAssembler<MemoryStore> {
        SectorTreeAssembler::new(repo, 64)
    }

    fn flatten<'a>(nodes: &'a [SectorNode], depth: i32, out: &mut Vec<(&'a SectorNode, i32)>) {
        for node in nodes {
            out.push((node, depth));
            flatten(&node.sub_sectors, depth + 1, out);
        }
    }

    #[tokio::test]
    async fn root_with_child_and_products() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Corner shop").await;
        let a = repo.create_sector(&sector_under(store, None, 0, "A")).await.unwrap();
        let b = repo.create_sector(&sector_under(store, Some(a.id), 1, "B")).await.unwrap();
        let p1 = repo.create_product(a.id, &product_input("P1", "1.50")).await.unwrap();
        let p2 = repo.create_product(b.id, &product_input("P2", "2.25")).await.unwrap();

        let tree = assembler(repo).build_sector_tree(store).await.unwrap();

        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.id, a.id);
        assert_eq!(root.level, 0);
        assert_eq!(root.products, vec![ProductNode::from(p1)]);
        assert_eq!(root.sub_sectors.len(), 1);
        let child = &root.sub_sectors[0];
        assert_eq!(child.id, b.id);
        assert_eq!(child.level, 1);
        assert_eq!(child.parent_id, Some(a.id));
        assert_eq!(child.products, vec![ProductNode::from(p2)]);
        assert!(child.sub_sectors.is_empty());
    }

    #[tokio::test]
    async fn serialized_shape_matches_renderer_contract() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Shape").await;
        let a = repo.create_sector(&sector_under(store, None, 0, "A")).await.unwrap();
        repo.create_product(a.id, &product_input("Milk", "85.50")).await.unwrap();

        let tree = assembler(repo).build_sector_tree(store).await.unwrap();
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json[0]["name"], "A");
        assert_eq!(json[0]["level"], 0);
        assert!(json[0]["parent_id"].is_null());
        assert_eq!(json[0]["products"][0]["price"], serde_json::json!(85.5));
        assert_eq!(json[0]["sub_sectors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn empty_and_unknown_stores_yield_empty_forest() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Empty").await;
        let assembler = assembler(repo);

        assert!(assembler.build_sector_tree(store).await.unwrap().is_empty());
        assert!(assembler.build_sector_tree(9_999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sectors_without_products_get_empty_lists() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Bare").await;
        let a = repo.create_sector(&sector_under(store, None, 0, "A")).await.unwrap();
        repo.create_sector(&sector_under(store, Some(a.id), 1, "B")).await.unwrap();

        let tree = assembler(repo).build_sector_tree(store).await.unwrap();

        assert!(tree[0].products.is_empty());
        assert!(tree[0].sub_sectors[0].products.is_empty());
    }

    #[tokio::test]
    async fn attachment_is_complete_and_exclusive() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Big").await;
        let other = seeded_store(&repo, "Other").await;

        // two roots, three levels, a product on most sectors
        let mut all_sectors = Vec::new();
        let mut all_products = Vec::new();
        for r in 0..2 {
            let root = repo
                .create_sector(&sector_under(store, None, 0, &format!("root-{r}")))
                .await
                .unwrap();
            all_sectors.push(root.clone());
            for c in 0..3 {
                let child = repo
                    .create_sector(&sector_under(store, Some(root.id), 1, &format!("child-{r}-{c}")))
                    .await
                    .unwrap();
                all_sectors.push(child.clone());
                let leaf = repo
                    .create_sector(&sector_under(store, Some(child.id), 2, &format!("leaf-{r}-{c}")))
                    .await
                    .unwrap();
                all_sectors.push(leaf.clone());
                for sector in [&child, &leaf] {
                    let p = repo
                        .create_product(sector.id, &product_input(&format!("p-{}", sector.id), "3.00"))
                        .await
                        .unwrap();
                    all_products.push(p);
                }
            }
        }
        let foreign = repo.create_sector(&sector_under(other, None, 0, "foreign")).await.unwrap();
        repo.create_product(foreign.id, &product_input("foreign", "1.00")).await.unwrap();

        let tree = assembler(repo).build_sector_tree(store).await.unwrap();
        let mut flat = Vec::new();
        flatten(&tree, 0, &mut flat);

        // every sector exactly once
        let seen: Vec<i64> = flat.iter().map(|(n, _)| n.id).collect();
        let seen_set: BTreeSet<i64> = seen.iter().copied().collect();
        assert_eq!(seen.len(), seen_set.len());
        assert_eq!(seen_set, all_sectors.iter().map(|s| s.id).collect());

        for (node, depth) in &flat {
            assert_eq!(node.level, *depth);
            let expected_children: BTreeSet<i64> = all_sectors
                .iter()
                .filter(|s| s.parent_id == Some(node.id))
                .map(|s| s.id)
                .collect();
            let actual_children: BTreeSet<i64> = node.sub_sectors.iter().map(|c| c.id).collect();
            assert_eq!(actual_children, expected_children);

            let expected_products: BTreeSet<i64> = all_products
                .iter()
                .filter(|p| p.sector_id == node.id)
                .map(|p| p.id)
                .collect();
            let actual_products: BTreeSet<i64> = node.products.iter().map(|p| p.id).collect();
            assert_eq!(actual_products, expected_products);
        }

        let attached: usize = flat.iter().map(|(n, _)| n.products.len()).sum();
        assert_eq!(attached, all_products.len());
        assert_eq!(tree.iter().map(SectorNode::sector_count).sum::<usize>(), all_sectors.len());
    }

    #[tokio::test]
    async fn consecutive_builds_are_identical() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Stable").await;
        let a = repo.create_sector(&sector_under(store, None, 0, "A")).await.unwrap();
        for name in ["B", "C", "D"] {
            let s = repo.create_sector(&sector_under(store, Some(a.id), 1, name)).await.unwrap();
            repo.create_product(s.id, &product_input(name, "1.00")).await.unwrap();
        }
        let assembler = assembler(repo);

        let first = assembler.build_sector_tree(store).await.unwrap();
        let second = assembler.build_sector_tree(store).await.unwrap();
        assert_eq!(first, second);
        let names: Vec<&str> = first[0].sub_sectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["B", "C", "D"]);
    }

    #[tokio::test]
    async fn computed_level_overrides_stored_level() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Stale").await;
        repo.insert_raw_sector(raw_sector(1, store, None, 3)).await;
        repo.insert_raw_sector(raw_sector(2, store, Some(1), 0)).await;

        let tree = assembler(repo.clone()).build_sector_tree(store).await.unwrap();
        assert_eq!(tree[0].level, 0);
        assert_eq!(tree[0].sub_sectors[0].level, 1);

        let report = assembler(repo).audit(store).await.unwrap();
        assert_eq!(
            report.level_mismatches,
            vec![
                LevelMismatch { sector_id: 1, stored: 3, computed: 0 },
                LevelMismatch { sector_id: 2, stored: 0, computed: 1 },
            ]
        );
        assert!(!report.is_consistent());
    }

    #[tokio::test]
    async fn two_sector_parent_cycle_is_detected() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Loop").await;
        repo.insert_raw_sector(raw_sector(10, store, None, 0)).await;
        repo.insert_raw_sector(raw_sector(20, store, Some(30), 1)).await;
        repo.insert_raw_sector(raw_sector(30, store, Some(20), 1)).await;

        let err = assembler(repo.clone()).build_sector_tree(store).await.unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { sector_id: 20 }));

        let report = assembler(repo).audit(store).await.unwrap();
        assert_eq!(report.cycles, vec![vec![20, 30]]);
        assert!(report.orphans.is_empty());
    }

    #[tokio::test]
    async fn orphans_are_skipped_not_fatal() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Orphans").await;
        repo.insert_raw_sector(raw_sector(10, store, None, 0)).await;
        repo.insert_raw_sector(raw_sector(11, store, Some(404), 1)).await;

        let tree = assembler(repo.clone()).build_sector_tree(store).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 10);

        let report = assembler(repo).audit(store).await.unwrap();
        assert_eq!(report.orphans, vec![11]);
        assert!(report.cycles.is_empty());
    }

    #[tokio::test]
    async fn ancestor_returned_as_child_stops_the_walk() {
        let source = Arc::new(LoopingSource::new());
        let assembler = SectorTreeAssembler::new(source, 64);

        let err = assembler.build_sector_tree(LoopingSource::STORE_ID).await.unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { sector_id: 1 }));
    }

    #[tokio::test]
    async fn depth_ceiling_is_enforced() {
        let repo = Arc::new(MemoryStore::new());
        let store = seeded_store(&repo, "Deep").await;
        let mut parent = None;
        for level in 0..4 {
            let s = repo
                .create_sector(&sector_under(store, parent, level, &format!("L{level}")))
                .await
                .unwrap();
            parent = Some(s.id);
        }

        let err = SectorTreeAssembler::new(repo.clone(), 3)
            .build_sector_tree(store)
            .await
            .unwrap_err();
        assert!(matches!(err, TreeError::DepthExceeded { max_depth: 3, .. }));

        let tree = SectorTreeAssembler::new(repo, 4).build_sector_tree(store).await.unwrap();
        assert_eq!(tree[0].sector_count(), 4);
    }

    #[test]
    fn analyze_reports_longer_cycles_from_smallest_id() {
        let sectors = vec![
            raw_sector(7, 1, Some(5), 0),
            raw_sector(5, 1, Some(9), 0),
            raw_sector(9, 1, Some(7), 0),
        ];
        let report = analyze_hierarchy(1, &sectors);
        assert_eq!(report.cycles, vec![vec![5, 9, 7]]);
        assert_eq!(report.sector_count, 3);
        // nothing on a cycle is reachable from a root
        assert!(report.level_mismatches.is_empty());
    }
}
