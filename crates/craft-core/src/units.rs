//! 可生產數量

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 可生產數量：有限整數或無上限
///
/// 排序時 `Unbounded` 大於任何有限值，因此 `min` 即為瓶頸。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// 有限數量（恆為非負整數）
    Finite(Decimal),
    /// 無上限（用量 <= 0 時）
    Unbounded,
}

impl Units {
    pub const ZERO: Units = Units::Finite(Decimal::ZERO);

    /// 以現有庫存與用量計算可生產數量（向零截斷）
    ///
    /// 用量 <= 0 視為不受限制。
    pub fn from_stock(on_hand_qty: Decimal, extended_qty: Decimal) -> Self {
        if extended_qty <= Decimal::ZERO {
            return Units::Unbounded;
        }

        match on_hand_qty.checked_div(extended_qty) {
            Some(ratio) => Units::Finite(ratio.trunc().max(Decimal::ZERO)),
            // 商溢出即實際上無上限
            None => Units::Unbounded,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Units::Finite(n) if n.is_zero())
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Units::Unbounded)
    }

    /// 有限值（無上限時為 None）
    pub fn finite(&self) -> Option<Decimal> {
        match self {
            Units::Finite(n) => Some(*n),
            Units::Unbounded => None,
        }
    }

    /// 是否足以生產指定數量
    pub fn covers(&self, quantity: Decimal) -> bool {
        match self {
            Units::Finite(n) => *n >= quantity,
            Units::Unbounded => true,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Finite(n) => write!(f, "{}", n.normalize()),
            Units::Unbounded => write!(f, "無上限"),
        }
    }
}
