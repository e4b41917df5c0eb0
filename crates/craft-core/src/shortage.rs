//! 缺料記錄

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 缺料種類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "qty", rename_all = "snake_case")]
pub enum ShortageKind {
    /// 尚缺數量（需求 - 現有庫存）
    Deficit(Decimal),
    /// BOM 引用了物料索引中不存在的代碼
    UnknownItem,
    /// 展開時回到了目前路徑上的物料
    Cycle,
}

/// 缺料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    /// 物料代碼
    pub item_code: String,

    /// 缺料種類
    pub kind: ShortageKind,
}

impl Shortage {
    pub fn deficit(item_code: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            item_code: item_code.into(),
            kind: ShortageKind::Deficit(quantity),
        }
    }

    pub fn unknown(item_code: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into(),
            kind: ShortageKind::UnknownItem,
        }
    }

    pub fn cycle(item_code: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into(),
            kind: ShortageKind::Cycle,
        }
    }

    /// 尚缺數量（非數量型缺料時為 None）
    pub fn deficit_qty(&self) -> Option<Decimal> {
        match self.kind {
            ShortageKind::Deficit(qty) => Some(qty),
            _ => None,
        }
    }
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ShortageKind::Deficit(qty) => write!(f, "{} 缺 {}", self.item_code, qty.normalize()),
            ShortageKind::UnknownItem => write!(f, "{} (未知物料)", self.item_code),
            ShortageKind::Cycle => write!(f, "{} (循環引用)", self.item_code),
        }
    }
}
