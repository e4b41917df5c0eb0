//! 庫存資料來源

use crate::{closure_rows, Result, Row, StockUpdate};

/// 庫存資料來源（資料庫等外部協作者）
///
/// 每次查詢都重新取得快照，引擎不在請求之間快取任何資料。
pub trait InventoryStore {
    /// 取得成品的遞迴閉包資料列
    fn fetch_bom(&self, finished_good_code: &str) -> Result<Vec<Row>>;

    /// 取得全部資料列
    fn fetch_all(&self) -> Result<Vec<Row>>;

    /// 寫入新的現有庫存（以物料代碼為鍵）
    fn apply_updates(&mut self, updates: &[StockUpdate]) -> Result<()>;
}

/// 記憶體內的庫存資料來源
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Vec<Row>,
}

impl InMemoryStore {
    /// 以資料列快照創建
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// 從 JSON 陣列載入
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Row> = serde_json::from_str(json)?;
        Ok(Self::new(rows))
    }

    /// 目前的資料列
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 查詢物料目前的現有庫存（取第一筆符合的列）
    pub fn on_hand(&self, item_code: &str) -> Option<rust_decimal::Decimal> {
        self.rows
            .iter()
            .find(|row| row.item_code == item_code)
            .map(|row| row.on_hand_qty)
    }
}

impl InventoryStore for InMemoryStore {
    fn fetch_bom(&self, finished_good_code: &str) -> Result<Vec<Row>> {
        Ok(closure_rows(&self.rows, finished_good_code))
    }

    fn fetch_all(&self) -> Result<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn apply_updates(&mut self, updates: &[StockUpdate]) -> Result<()> {
        // 在副本上套用，全部完成後才替換
        let mut staged = self.rows.clone();
        for update in updates {
            for row in staged
                .iter_mut()
                .filter(|row| row.item_code == update.item_code)
            {
                row.on_hand_qty = update.on_hand_after;
            }
        }
        self.rows = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemType;
    use rust_decimal::Decimal;

    const SNAPSHOT: &str = r#"[
        {"Code": "FG1", "Item-Level": 1, "Item code": "SUB", "Type": "Manufactured", "On-hand Qty": 0, "Extended Quantity": 1},
        {"Code": "SUB", "Item-Level": 1, "Item code": "P1", "Type": "Purchased Item", "On-hand Qty": 8, "Extended Quantity": 2},
        {"Code": "FG2", "Item-Level": 1, "Item code": "P1", "Type": "Purchased Item", "On-hand Qty": 8, "Extended Quantity": 1}
    ]"#;

    #[test]
    fn test_load_from_json() {
        let store = InMemoryStore::from_json(SNAPSHOT).unwrap();

        assert_eq!(store.rows().len(), 3);
        assert_eq!(store.rows()[0].item_type, ItemType::Other("Manufactured".to_string()));
        assert_eq!(store.on_hand("P1"), Some(Decimal::from(8)));
    }

    #[test]
    fn test_fetch_bom_returns_closure() {
        let store = InMemoryStore::from_json(SNAPSHOT).unwrap();

        let rows = store.fetch_bom("FG1").unwrap();
        let items: Vec<&str> = rows.iter().map(|r| r.item_code.as_str()).collect();
        assert_eq!(items, vec!["SUB", "P1"]);

        assert!(store.fetch_bom("MISSING").unwrap().is_empty());
    }

    #[test]
    fn test_apply_updates_by_item_code() {
        let mut store = InMemoryStore::from_json(SNAPSHOT).unwrap();

        store
            .apply_updates(&[StockUpdate {
                item_code: "P1".to_string(),
                on_hand_before: Decimal::from(8),
                required_qty: Decimal::from(2),
                on_hand_after: Decimal::from(6),
            }])
            .unwrap();

        // 同一物料代碼的每一列都會更新
        let p1_rows: Vec<_> = store.rows().iter().filter(|r| r.item_code == "P1").collect();
        assert_eq!(p1_rows.len(), 2);
        assert!(p1_rows.iter().all(|r| r.on_hand_qty == Decimal::from(6)));
        assert_eq!(store.on_hand("SUB"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_invalid_json() {
        assert!(InMemoryStore::from_json("[{]").is_err());
    }
}
