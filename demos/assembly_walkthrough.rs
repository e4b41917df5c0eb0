//! 成品分類與組裝示例

use craft::{AssemblyExecutor, CatalogClassifier, Confirmation, EngineConfig, InMemoryStore};

const SNAPSHOT: &str = r#"[
    {"Code": "BIKE", "Item-Level": 1, "Item code": "FRAME", "Type": "Manufactured", "On-hand Qty": 0, "Extended Quantity": 1},
    {"Code": "BIKE", "Item-Level": 2, "Item code": "STEEL-TUBE", "Type": "Purchased Item", "On-hand Qty": 30, "Extended Quantity": 3},
    {"Code": "BIKE", "Item-Level": 1, "Item code": "WHEEL", "Type": "Purchased Item", "On-hand Qty": 16, "Extended Quantity": 2},
    {"Code": "SCOOTER", "Item-Level": 1, "Item code": "DECK", "Type": "Purchased Item", "On-hand Qty": 0, "Extended Quantity": 1},
    {"Code": "SCOOTER", "Item-Level": 1, "Item code": "WHEEL", "Type": "Purchased Item", "On-hand Qty": 16, "Extended Quantity": 2}
]"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 成品分類與組裝示例 ===\n");

    let mut store = InMemoryStore::from_json(SNAPSHOT)?;
    let classifier = CatalogClassifier::new(EngineConfig::default())?;

    let report = classifier.classify_store(&store, chrono::Local::now().date_naive())?;
    println!("{report}");

    let plan = AssemblyExecutor::preview(&store, "BIKE", 4)?;
    println!("{plan}");

    let receipt = AssemblyExecutor::commit(&mut store, &plan, Confirmation::from_answer("yes"))?;
    println!(
        "已組裝 {} 件 {}，更新 {} 項物料",
        receipt.quantity, receipt.finished_good_code, receipt.updated_items
    );

    match AssemblyExecutor::preview(&store, "BIKE", 10) {
        Ok(plan) => println!("{plan}"),
        Err(err) => {
            println!("無法組裝（{}）: {}", err.reason(), err);
            for shortage in err.shortages() {
                println!("  - {shortage}");
            }
        }
    }

    Ok(())
}
