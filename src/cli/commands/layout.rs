use anyhow::anyhow;
use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::{connect, output_json, store_repository};
use crate::cli::OutputFormat;
use crate::database::{PgStoreRepository, StoreRepository};
use crate::services::{HierarchyReport, SectorNode, SectorTreeAssembler};

#[derive(Subcommand)]
pub enum LayoutCommands {
    #[command(about = "Print the assembled sector tree of a store")]
    Tree {
        #[arg(help = "Store id")]
        store_id: i64,
    },

    #[command(about = "Check a store's sectors for cycles, orphans and stale levels")]
    Audit {
        #[arg(help = "Store id")]
        store_id: i64,
    },
}

pub async fn handle(cmd: LayoutCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, db) = connect().await?;
    let repo = store_repository(&db);
    let result = inspect(cmd, output_format, repo.as_ref(), config.layout.max_tree_depth).await;
    db.close().await;
    result
}

async fn inspect(
    cmd: LayoutCommands,
    output_format: OutputFormat,
    repo: &PgStoreRepository,
    max_depth: usize,
) -> anyhow::Result<()> {
    let assembler = SectorTreeAssembler::new(Arc::new(repo.clone()), max_depth);

    match cmd {
        LayoutCommands::Tree { store_id } => {
            let store = repo
                .get_store(store_id)
                .await?
                .ok_or_else(|| anyhow!("Store {store_id} not found"))?;
            let tree = assembler.build_sector_tree(store_id).await?;
            match output_format {
                OutputFormat::Json => output_json(&tree),
                OutputFormat::Text => {
                    println!("{} (#{})", store.name, store.id);
                    print!("{}", render_tree(&tree));
                    Ok(())
                }
            }
        }
        LayoutCommands::Audit { store_id } => {
            let report = assembler.audit(store_id).await?;
            match output_format {
                OutputFormat::Json => output_json(&report),
                OutputFormat::Text => {
                    print!("{}", render_report(&report));
                    Ok(())
                }
            }
        }
    }
}

/// Indented outline, two spaces per level
pub fn render_tree(nodes: &[SectorNode]) -> String {
    fn walk(node: &SectorNode, out: &mut String) {
        let indent = "  ".repeat(node.level as usize + 1);
        out.push_str(&format!(
            "{indent}{} (#{}, level {}, {} products)\n",
            node.name,
            node.id,
            node.level,
            node.products.len()
        ));
        for child in &node.sub_sectors {
            walk(child, out);
        }
    }

    let mut out = String::new();
    for node in nodes {
        walk(node, &mut out);
    }
    out
}

pub fn render_report(report: &HierarchyReport) -> String {
    let mut out = format!("Store {}: {} sector(s)\n", report.store_id, report.sector_count);
    if report.is_consistent() {
        out.push_str("Hierarchy is consistent\n");
        return out;
    }
    for cycle in &report.cycles {
        let ids: Vec<String> = cycle.iter().map(i64::to_string).collect();
        out.push_str(&format!("cycle: {}\n", ids.join(" -> ")));
    }
    for orphan in &report.orphans {
        out.push_str(&format!("orphan: sector {orphan} has a missing parent\n"));
    }
    for mismatch in &report.level_mismatches {
        out.push_str(&format!(
            "level: sector {} stored {}, expected {}\n",
            mismatch.sector_id, mismatch.stored, mismatch.computed
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sector_tree::LevelMismatch;

    #[test]
    fn renders_nested_outline() {
        let child = SectorNode {
            id: 2,
            store_id: 1,
            name: "Cheese".to_string(),
            description: String::new(),
            position_x: 0.0,
            position_y: 0.0,
            width: 1.0,
            height: 1.0,
            level: 1,
            parent_id: Some(1),
            products: Vec::new(),
            sub_sectors: Vec::new(),
        };
        let root = SectorNode {
            id: 1,
            name: "Dairy".to_string(),
            level: 0,
            parent_id: None,
            sub_sectors: vec![child.clone()],
            ..child
        };
        assert_eq!(
            render_tree(&[root]),
            "  Dairy (#1, level 0, 0 products)\n    Cheese (#2, level 1, 0 products)\n"
        );
    }

    #[test]
    fn report_lists_each_problem() {
        let report = HierarchyReport {
            store_id: 4,
            sector_count: 3,
            cycles: vec![vec![5, 7]],
            orphans: vec![9],
            level_mismatches: vec![LevelMismatch {
                sector_id: 2,
                stored: 3,
                computed: 1,
            }],
        };
        let text = render_report(&report);
        assert!(text.contains("cycle: 5 -> 7"));
        assert!(text.contains("orphan: sector 9"));
        assert!(text.contains("sector 2 stored 3, expected 1"));
    }
}
