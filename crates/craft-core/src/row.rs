//! BOM 列模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 物料類型
///
/// 來源資料的類型欄位為自由文字，解析時忽略大小寫與前後空白。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    /// 採購件（不再展開）
    PurchasedItem,
    /// 成品（補位節點使用）
    FinishedGood,
    /// 其他自製件/半成品，保留原始文字
    Other(String),
}

impl ItemType {
    /// 解析類型文字
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "purchased item" => ItemType::PurchasedItem,
            "finished_good" => ItemType::FinishedGood,
            _ => ItemType::Other(label.to_string()),
        }
    }

    /// 是否為採購件
    pub fn is_purchased(&self) -> bool {
        matches!(self, ItemType::PurchasedItem)
    }

    pub fn label(&self) -> &str {
        match self {
            ItemType::PurchasedItem => "purchased item",
            ItemType::FinishedGood => "finished_good",
            ItemType::Other(label) => label,
        }
    }
}

impl From<String> for ItemType {
    fn from(label: String) -> Self {
        ItemType::parse(&label)
    }
}

impl From<&str> for ItemType {
    fn from(label: &str) -> Self {
        ItemType::parse(label)
    }
}

impl From<ItemType> for String {
    fn from(item_type: ItemType) -> Self {
        item_type.label().to_string()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一筆 BOM 資料
///
/// 欄位同時接受來源資料表的欄位名稱（如 `Item code`、`On-hand Qty`），
/// 資料表匯出的 JSON 可直接載入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 所屬成品代碼
    #[serde(alias = "Code")]
    pub finished_good_code: String,

    /// 展開層級（0 = 成品本身，1 = 直接子件）
    #[serde(alias = "Item-Level")]
    pub level: u32,

    /// 物料代碼
    #[serde(alias = "Item code")]
    pub item_code: String,

    /// 物料類型
    #[serde(alias = "Type")]
    pub item_type: ItemType,

    /// 現有庫存
    #[serde(alias = "On-hand Qty")]
    pub on_hand_qty: Decimal,

    /// 每單位父件的用量
    #[serde(alias = "Extended Quantity")]
    pub extended_qty: Decimal,
}

impl Row {
    /// 創建新的 BOM 列
    pub fn new(
        finished_good_code: impl Into<String>,
        level: u32,
        item_code: impl Into<String>,
        item_type: ItemType,
        on_hand_qty: Decimal,
        extended_qty: Decimal,
    ) -> Self {
        Self {
            finished_good_code: finished_good_code.into(),
            level,
            item_code: item_code.into(),
            item_type,
            on_hand_qty,
            extended_qty,
        }
    }

    /// 成品沒有自己的資料列時使用的補位節點
    pub fn placeholder(finished_good_code: &str) -> Self {
        Self::new(
            finished_good_code,
            0,
            finished_good_code,
            ItemType::FinishedGood,
            Decimal::ZERO,
            Decimal::ONE,
        )
    }
}

/// 取出成品的遞迴閉包資料列
///
/// 先取所屬成品為 `finished_good_code` 的列，再逐輪加入所屬成品等於上一輪物料代碼的列
/// （半成品自己的 BOM）。每個成品代碼只展開一次，循環資料也會終止。
pub fn closure_rows(all_rows: &[Row], finished_good_code: &str) -> Vec<Row> {
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut frontier: Vec<&str> = vec![finished_good_code];
    let mut closure = Vec::new();

    loop {
        let codes: HashSet<&str> = frontier
            .iter()
            .copied()
            .filter(|code| expanded.insert(*code))
            .collect();
        if codes.is_empty() {
            break;
        }

        let mut next = Vec::new();
        for row in all_rows
            .iter()
            .filter(|row| codes.contains(row.finished_good_code.as_str()))
        {
            closure.push(row.clone());
            next.push(row.item_code.as_str());
        }
        frontier = next;
    }

    closure
}
