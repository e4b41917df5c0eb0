//! # Craft Calculation Engine
//!
//! BOM 展開、可生產量計算、成品分類與組裝

pub mod assembly;
pub mod availability;
pub mod catalog;
pub mod tree;

// Re-export 主要類型
pub use assembly::AssemblyExecutor;
pub use availability::{Availability, AvailabilityCalculator};
pub use catalog::{
    explode_good, finished_good_codes, missing_percentage, CatalogClassifier, CatalogReport,
    CraftableGood, NonCraftableGood, Verdict,
};
pub use tree::{BomTree, ItemIndex, TreeBuilder};
