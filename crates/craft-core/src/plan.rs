//! 組裝計劃模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{CraftError, Result, Row, Units};

/// 單一物料的庫存異動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    /// 物料代碼
    pub item_code: String,

    /// 異動前庫存
    pub on_hand_before: Decimal,

    /// 本次消耗量（用量 × 組裝數量）
    pub required_qty: Decimal,

    /// 異動後庫存（不低於 0）
    pub on_hand_after: Decimal,
}

impl StockUpdate {
    /// 計算組裝 `quantity` 件後該物料的庫存
    pub fn consume(row: &Row, quantity: Decimal) -> Result<Self> {
        let required_qty = row.extended_qty.checked_mul(quantity).ok_or_else(|| {
            CraftError::Calculation(format!(
                "{} 消耗量溢出：{} × {}",
                row.item_code, row.extended_qty, quantity
            ))
        })?;

        let on_hand_after = row
            .on_hand_qty
            .checked_sub(required_qty)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO);

        Ok(Self {
            item_code: row.item_code.clone(),
            on_hand_before: row.on_hand_qty,
            required_qty,
            on_hand_after,
        })
    }
}

/// 組裝計劃（預覽結果，等待確認後寫入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyPlan {
    /// 計劃ID
    pub id: Uuid,

    /// 成品代碼
    pub finished_good_code: String,

    /// 組裝數量
    pub quantity: u32,

    /// 試算時的最大可生產量
    pub max_units: Units,

    /// 各物料庫存異動（依物料索引順序）
    pub updates: Vec<StockUpdate>,
}

impl AssemblyPlan {
    /// 創建新的組裝計劃
    pub fn new(
        finished_good_code: String,
        quantity: u32,
        max_units: Units,
        updates: Vec<StockUpdate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            finished_good_code,
            quantity,
            max_units,
            updates,
        }
    }

    /// 查詢某物料的異動
    pub fn update_for(&self, item_code: &str) -> Option<&StockUpdate> {
        self.updates.iter().find(|u| u.item_code == item_code)
    }
}

impl fmt::Display for AssemblyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "組裝 {} 件 {} 的庫存異動預覽：",
            self.quantity, self.finished_good_code
        )?;
        for update in &self.updates {
            writeln!(
                f,
                "  {}: 異動前 {}, 異動後 {}",
                update.item_code,
                update.on_hand_before.normalize(),
                update.on_hand_after.normalize()
            )?;
        }
        Ok(())
    }
}

/// 組裝確認
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    /// 確認寫入
    Confirmed,
    /// 拒絕（取消操作）
    Declined,
}

impl Confirmation {
    /// 解析使用者回答，只有 "yes" 視為確認
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("yes") {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }

    pub fn is_confirmed(&self) -> bool {
        *self == Confirmation::Confirmed
    }
}

/// 組裝完成回執
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReceipt {
    /// 對應的計劃ID
    pub plan_id: Uuid,

    /// 成品代碼
    pub finished_good_code: String,

    /// 組裝數量
    pub quantity: u32,

    /// 已寫入的物料數
    pub updated_items: usize,
}
