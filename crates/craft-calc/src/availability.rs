//! 可生產量計算

use craft_core::{CraftError, Shortage, Units};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::tree::{BomTree, ItemIndex};

/// 可生產量計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    /// 最大可生產量
    pub units: Units,

    /// 缺料清單（先序走訪順序）
    pub shortages: Vec<Shortage>,
}

/// 可生產量計算器
///
/// 深度優先展開 BOM：
/// 1. 代碼不在索引中 → 記錄未知物料，該分支為 0
/// 2. 採購件不再展開，庫存不足即為 0
/// 3. 現有庫存已足夠時不走訪子件
/// 4. 否則取各子件可生產量的最小值，任一子件為 0 則整個節點為 0
///
/// 走訪使用顯式堆疊，BOM 層數不受執行緒堆疊大小限制。
pub struct AvailabilityCalculator<'a> {
    tree: &'a BomTree,
    index: &'a ItemIndex,
}

/// 單一節點的評估結果
enum Visit<'a> {
    /// 已得出可生產量
    Resolved(Units),
    /// 需要展開子件
    Expand(&'a [String]),
}

/// 展開中的節點
struct Frame<'a> {
    item_code: String,
    quantity_needed: Decimal,
    children: &'a [String],
    cursor: usize,
    bottleneck: Units,
}

impl<'a> Frame<'a> {
    fn new(item_code: &str, quantity_needed: Decimal, children: &'a [String]) -> Self {
        Self {
            item_code: item_code.to_string(),
            quantity_needed,
            children,
            cursor: 0,
            bottleneck: Units::Unbounded,
        }
    }
}

impl<'a> AvailabilityCalculator<'a> {
    pub fn new(tree: &'a BomTree, index: &'a ItemIndex) -> Self {
        Self { tree, index }
    }

    /// 計算 `item_code` 在需求 `quantity_needed` 下的最大可生產量
    pub fn max_units(
        &self,
        item_code: &str,
        quantity_needed: Decimal,
    ) -> craft_core::Result<Availability> {
        let mut shortages = Vec::new();

        let units = self.explode(item_code, quantity_needed, &mut shortages)?;

        tracing::debug!(
            "{} 需求 {} → 可生產 {}，缺料 {} 筆",
            item_code,
            quantity_needed,
            units,
            shortages.len()
        );

        Ok(Availability { units, shortages })
    }

    fn explode(
        &self,
        item_code: &str,
        quantity_needed: Decimal,
        shortages: &mut Vec<Shortage>,
    ) -> craft_core::Result<Units> {
        let mut on_path = HashSet::new();
        let children = match self.visit(item_code, quantity_needed, &on_path, shortages) {
            Visit::Resolved(units) => return Ok(units),
            Visit::Expand(children) => children,
        };

        on_path.insert(item_code.to_string());
        let mut stack = vec![Frame::new(item_code, quantity_needed, children)];
        let mut units = Units::Unbounded;

        while let Some(frame) = stack.last_mut() {
            let children = frame.children;
            let Some(child) = children.get(frame.cursor) else {
                // 子件走訪完畢，瓶頸回傳給父件
                units = frame.bottleneck;
                on_path.remove(frame.item_code.as_str());
                stack.pop();
                if let Some(parent) = stack.last_mut() {
                    parent.bottleneck = parent.bottleneck.min(units);
                }
                continue;
            };
            frame.cursor += 1;

            let child_needed = self.child_quantity(child, frame.quantity_needed)?;
            match self.visit(child, child_needed, &on_path, shortages) {
                // 0 會逐層傳回，所有祖先同樣為 0
                Visit::Resolved(child_units) if child_units.is_zero() => return Ok(Units::ZERO),
                Visit::Resolved(child_units) => {
                    frame.bottleneck = frame.bottleneck.min(child_units);
                }
                Visit::Expand(grandchildren) => {
                    on_path.insert(child.clone());
                    stack.push(Frame::new(child, child_needed, grandchildren));
                }
            }
        }

        Ok(units)
    }

    /// 評估單一節點；需要展開時回傳子件列表
    fn visit(
        &self,
        item_code: &str,
        quantity_needed: Decimal,
        on_path: &HashSet<String>,
        shortages: &mut Vec<Shortage>,
    ) -> Visit<'a> {
        let Some(row) = self.index.get(item_code) else {
            tracing::warn!("BOM 引用了不存在的物料: {}", item_code);
            shortages.push(Shortage::unknown(item_code));
            return Visit::Resolved(Units::ZERO);
        };

        if on_path.contains(item_code) {
            tracing::warn!("BOM 循環引用: {}", item_code);
            shortages.push(Shortage::cycle(item_code));
            return Visit::Resolved(Units::ZERO);
        }

        let on_hand = row.on_hand_qty;
        let extended = row.extended_qty;

        if extended <= Decimal::ZERO {
            tracing::warn!("物料 {} 用量為 {}，視為不受限制", item_code, extended);
        }

        // 採購件：庫存不足即終止
        if row.item_type.is_purchased() {
            if on_hand < quantity_needed {
                shortages.push(Shortage::deficit(item_code, quantity_needed - on_hand));
                return Visit::Resolved(Units::ZERO);
            }
            return Visit::Resolved(Units::from_stock(on_hand, extended));
        }

        // 現有庫存足夠，不需展開
        if on_hand >= quantity_needed {
            return Visit::Resolved(Units::from_stock(on_hand, extended));
        }

        if let Some(children) = self.tree.children(item_code) {
            return Visit::Expand(children);
        }

        // 沒有子件且庫存不足
        shortages.push(Shortage::deficit(item_code, quantity_needed - on_hand));
        Visit::Resolved(Units::ZERO)
    }

    /// 子件需求量 = 父件需求量 × 子件用量
    fn child_quantity(&self, child: &str, parent_needed: Decimal) -> craft_core::Result<Decimal> {
        let ratio = self
            .index
            .get(child)
            .map(|row| row.extended_qty)
            .unwrap_or(Decimal::ONE);
        parent_needed.checked_mul(ratio).ok_or_else(|| {
            CraftError::Calculation(format!(
                "{} 需求量溢出：{} × {}",
                child, parent_needed, ratio
            ))
        })
    }
}
