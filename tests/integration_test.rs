//! 集成測試

use chrono::NaiveDate;
use craft::*;
use rust_decimal::Decimal;
use rstest::rstest;

fn row(fg: &str, level: u32, item: &str, item_type: &str, on_hand: i64, extended: i64) -> Row {
    Row::new(
        fg,
        level,
        item,
        ItemType::parse(item_type),
        Decimal::from(on_hand),
        Decimal::from(extended),
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

fn max_units(rows: &[Row], root: &str, quantity: i64) -> Availability {
    let (index, tree) = TreeBuilder::build(rows, root);
    AvailabilityCalculator::new(&tree, &index)
        .max_units(root, Decimal::from(quantity))
        .unwrap()
}

#[rstest]
#[case::stocked(10, Units::Finite(Decimal::from(5)), vec![])]
#[case::empty(0, Units::ZERO, vec![Shortage::deficit("P1", Decimal::from(2))])]
fn test_single_level_bom(
    #[case] on_hand: i64,
    #[case] expected_units: Units,
    #[case] expected_shortages: Vec<Shortage>,
) {
    // FG1 → P1 ×2
    let rows = vec![row("FG1", 1, "P1", "Purchased Item", on_hand, 2)];

    let result = max_units(&rows, "FG1", 1);

    assert_eq!(result.units, expected_units);
    assert_eq!(result.shortages, expected_shortages);
}

#[test]
fn test_multi_level_bom_explodes_through_sub_assembly() {
    // FG2
    //  └── SUB (自製件，庫存 0) ×1
    //       └── P2 (採購件，庫存 4) ×1
    let rows = vec![
        row("FG2", 1, "SUB", "Manufactured", 0, 1),
        row("FG2", 2, "P2", "purchased item", 4, 1),
    ];

    let result = max_units(&rows, "FG2", 3);

    assert_eq!(result.units, Units::Finite(Decimal::from(4)));
    assert!(result.shortages.is_empty());
}

#[test]
fn test_assemble_updates_stock() {
    let mut store = InMemoryStore::new(vec![row("FG1", 1, "P1", "purchased item", 10, 2)]);

    let plan = AssemblyExecutor::preview(&store, "FG1", 2).unwrap();
    assert_eq!(plan.update_for("P1").unwrap().on_hand_after, Decimal::from(6));
    // 預覽不寫入
    assert_eq!(store.on_hand("P1"), Some(Decimal::from(10)));

    let receipt = AssemblyExecutor::commit(&mut store, &plan, Confirmation::Confirmed).unwrap();

    assert_eq!(receipt.quantity, 2);
    assert_eq!(store.on_hand("P1"), Some(Decimal::from(6)));
}

#[test]
fn test_assemble_missing_finished_good() {
    let mut store = InMemoryStore::new(vec![row("FG1", 1, "P1", "purchased item", 10, 2)]);

    let err = AssemblyExecutor::assemble(&mut store, "FG9", 1, |_| Confirmation::Confirmed)
        .unwrap_err();

    assert_eq!(err.reason(), "not_found");
}

#[test]
fn test_assemble_insufficient_stock_does_not_mutate() {
    let mut store = InMemoryStore::new(vec![row("FG1", 1, "P1", "purchased item", 10, 2)]);
    let mut asked = false;

    let err = AssemblyExecutor::assemble(&mut store, "FG1", 6, |_| {
        asked = true;
        Confirmation::Confirmed
    })
    .unwrap_err();

    assert_eq!(err.reason(), "insufficient_stock");
    assert_eq!(err.shortages(), &[Shortage::deficit("P1", Decimal::from(2))]);
    assert!(!asked);
    assert_eq!(store.on_hand("P1"), Some(Decimal::from(10)));
}

/// 寫入必定失敗的資料來源
struct BrokenStore {
    inner: InMemoryStore,
}

impl InventoryStore for BrokenStore {
    fn fetch_bom(&self, finished_good_code: &str) -> craft::Result<Vec<Row>> {
        self.inner.fetch_bom(finished_good_code)
    }

    fn fetch_all(&self) -> craft::Result<Vec<Row>> {
        self.inner.fetch_all()
    }

    fn apply_updates(&mut self, _updates: &[StockUpdate]) -> craft::Result<()> {
        Err(CraftError::Calculation("connection reset".to_string()))
    }
}

#[test]
fn test_persistence_failure_is_surfaced() {
    let mut store = BrokenStore {
        inner: InMemoryStore::new(vec![row("FG1", 1, "P1", "purchased item", 10, 2)]),
    };

    let err = AssemblyExecutor::assemble(&mut store, "FG1", 1, |plan| {
        assert!(plan.to_string().contains("P1: 異動前 10, 異動後 8"));
        Confirmation::from_answer("yes")
    })
    .unwrap_err();

    assert_eq!(err.reason(), "persistence_error");
    assert!(err.to_string().contains("connection reset"));
}

#[test]
fn test_classification_is_exclusive() {
    let rows = vec![
        row("FG1", 1, "P1", "purchased item", 10, 2),
        row("FG2", 1, "SUB", "Manufactured", 0, 1),
        row("FG2", 2, "P2", "purchased item", 4, 1),
        row("FG3", 1, "P3", "purchased item", 1, 3),
        row("FG4", 1, "P4", "purchased item", 0, 1),
    ];
    let store = InMemoryStore::new(rows);

    let report = CatalogClassifier::default()
        .classify_store(&store, today())
        .unwrap();

    let craftable: Vec<&str> = report
        .craftable
        .iter()
        .map(|g| g.finished_good_code.as_str())
        .collect();
    let non_craftable: Vec<&str> = report
        .non_craftable
        .iter()
        .map(|g| g.finished_good_code.as_str())
        .collect();

    assert_eq!(craftable, vec!["FG1", "FG2"]);
    assert_eq!(non_craftable, vec!["FG3", "FG4"]);
    assert!(craftable.iter().all(|code| !non_craftable.contains(code)));

    for good in &report.non_craftable {
        assert!(good.missing_percentage >= Decimal::ZERO);
        assert!(good.missing_percentage <= Decimal::ONE_HUNDRED);
        assert!(good.estimated_date > today());
    }

    // FG3：P3 需 3 有 1 → 缺 2，2/3 ≈ 66.67% → 6 天
    let fg3 = &report.non_craftable[0];
    assert_eq!(fg3.missing_percentage.round_dp(2), Decimal::new(6667, 2));
    assert_eq!(fg3.estimated_date, NaiveDate::from_ymd_opt(2025, 11, 7).unwrap());
}

#[test]
fn test_sub_assembly_bom_is_pulled_from_snapshot() {
    // SUB 的 BOM 記錄在自己的成品代碼下
    let json = r#"[
        {"Code": "FG1", "Item-Level": 1, "Item code": "SUB", "Type": "Manufactured", "On-hand Qty": 0, "Extended Quantity": 2},
        {"Code": "SUB", "Item-Level": 1, "Item code": "P1", "Type": "Purchased Item", "On-hand Qty": 9, "Extended Quantity": 3}
    ]"#;
    let store = InMemoryStore::from_json(json).unwrap();

    let rows = store.fetch_bom("FG1").unwrap();
    let (index, tree) = TreeBuilder::build(&rows, "FG1");

    assert!(index.contains("P1"));
    // 子 BOM 的第 1 層列同樣掛在成品下
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        serde_json::json!({ "FG1": ["SUB", "P1"] })
    );
}

#[test]
fn test_report_renders_sections() {
    let rows = vec![
        row("FG1", 1, "P1", "purchased item", 10, 2),
        row("FG2", 1, "P2", "purchased item", 0, 1),
    ];

    let report = CatalogClassifier::default()
        .classify_on(&rows, today())
        .unwrap();
    let text = report.to_string();

    let missing_section = text.find("無法生產的成品").unwrap();
    let craftable_section = text.find("可生產的成品:").unwrap();
    assert!(missing_section < craftable_section);
    assert!(text.contains("成品: FG2 | 缺料: P2"));
    assert!(text.contains("成品: FG1 | 最大可生產量: 5"));
}
