//! BOM 樹重建

use craft_core::Row;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// 物料索引：物料代碼 → 資料列
///
/// 重複的物料代碼保留最後一筆資料，迭代順序為首次出現的順序。
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    rows: HashMap<String, Row>,
    order: Vec<String>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入或覆蓋資料列
    pub fn insert(&mut self, row: Row) {
        if !self.rows.contains_key(&row.item_code) {
            self.order.push(row.item_code.clone());
        }
        self.rows.insert(row.item_code.clone(), row);
    }

    pub fn get(&self, item_code: &str) -> Option<&Row> {
        self.rows.get(item_code)
    }

    pub fn contains(&self, item_code: &str) -> bool {
        self.rows.contains_key(item_code)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 依首次出現順序迭代
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.order.iter().filter_map(|code| self.rows.get(code))
    }
}

/// BOM 樹：父件代碼 → 子件代碼（依發現順序）
///
/// 不是鍵的代碼在展開時視為末端節點，與宣告的物料類型無關。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BomTree {
    children: BTreeMap<String, Vec<String>>,
}

impl BomTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_child(&mut self, parent: &str, child: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    /// 子件列表（沒有子件時為 None）
    pub fn children(&self, item_code: &str) -> Option<&[String]> {
        self.children.get(item_code).map(Vec::as_slice)
    }

    pub fn has_children(&self, item_code: &str) -> bool {
        self.children.contains_key(item_code)
    }

    /// 列出所有以 `item_code` 為子件的父件
    pub fn parents_of(&self, item_code: &str) -> Vec<&str> {
        self.children
            .iter()
            .filter(|(_, kids)| kids.iter().any(|kid| kid == item_code))
            .map(|(parent, _)| parent.as_str())
            .collect()
    }

    /// 有子件的父件數量
    pub fn parent_count(&self) -> usize {
        self.children.len()
    }
}

/// BOM 樹建構器
pub struct TreeBuilder;

impl TreeBuilder {
    /// 由依層級排列的平面資料列重建物料索引與 BOM 樹
    ///
    /// 資料列需為先序排列：父件出現在子件之前，層級隨深度遞增。
    /// 以 (物料代碼, 層級) 堆疊追蹤目前路徑，彈出層級 >= 目前列的項目後，
    /// 堆疊頂端即為父件。最後所有第 1 層的列一律掛在成品下。
    pub fn build(rows: &[Row], root_code: &str) -> (ItemIndex, BomTree) {
        let mut index = ItemIndex::new();
        for row in rows {
            index.insert(row.clone());
        }
        if !index.contains(root_code) {
            index.insert(Row::placeholder(root_code));
        }

        let mut tree = BomTree::new();
        let mut parent_stack: Vec<(&str, u32)> = Vec::new();

        for row in rows {
            while parent_stack
                .last()
                .is_some_and(|(_, level)| *level >= row.level)
            {
                parent_stack.pop();
            }

            if let Some((parent, _)) = parent_stack.last() {
                tree.add_child(parent, &row.item_code);
            }

            parent_stack.push((row.item_code.as_str(), row.level));
        }

        // 沒有第 0 層資料時，第 1 層物料仍需掛在成品下
        for row in rows.iter().filter(|row| row.level == 1) {
            let linked = tree
                .children(root_code)
                .is_some_and(|kids| kids.contains(&row.item_code));
            if !linked {
                tree.add_child(root_code, &row.item_code);
            }
        }

        (index, tree)
    }
}
