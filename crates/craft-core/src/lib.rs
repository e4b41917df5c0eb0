//! # Craft Core
//!
//! BOM 可生產量引擎的核心資料模型與類型定義

pub mod config;
pub mod plan;
pub mod row;
pub mod shortage;
pub mod store;
pub mod units;

// Re-export 主要類型
pub use config::EngineConfig;
pub use plan::{AssemblyPlan, AssemblyReceipt, Confirmation, StockUpdate};
pub use row::{closure_rows, ItemType, Row};
pub use shortage::{Shortage, ShortageKind};
pub use store::{InMemoryStore, InventoryStore};
pub use units::Units;

use rust_decimal::Decimal;

/// 引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CraftError {
    #[error("找不到成品的 BOM 資料: {0}")]
    NotFound(String),

    #[error("庫存不足：{code} 需要 {requested} 件，最多可生產 {max_units} 件")]
    InsufficientStock {
        code: String,
        requested: Decimal,
        max_units: Units,
        shortages: Vec<Shortage>,
    },

    #[error("操作已取消: {0}")]
    Cancelled(String),

    #[error("庫存寫入失敗: {0}")]
    Persistence(String),

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("計算錯誤: {0}")]
    Calculation(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CraftError {
    /// 失敗原因標籤（供外層 API 回報）
    pub fn reason(&self) -> &'static str {
        match self {
            CraftError::NotFound(_) => "not_found",
            CraftError::InsufficientStock { .. } => "insufficient_stock",
            CraftError::Cancelled(_) => "cancelled",
            CraftError::Persistence(_) => "persistence_error",
            CraftError::InvalidQuantity(_) => "invalid_quantity",
            CraftError::InvalidConfig(_) => "invalid_config",
            CraftError::InvalidDate(_) => "invalid_date",
            CraftError::Calculation(_) => "calculation_error",
            CraftError::Serialization(_) => "serialization_error",
        }
    }

    /// 缺料清單（僅庫存不足時有值）
    pub fn shortages(&self) -> &[Shortage] {
        match self {
            CraftError::InsufficientStock { shortages, .. } => shortages,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, CraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags() {
        assert_eq!(CraftError::NotFound("FG1".to_string()).reason(), "not_found");
        assert_eq!(CraftError::Cancelled("FG1".to_string()).reason(), "cancelled");
        assert_eq!(
            CraftError::Persistence("disk full".to_string()).reason(),
            "persistence_error"
        );

        let err = CraftError::InsufficientStock {
            code: "FG1".to_string(),
            requested: Decimal::from(3),
            max_units: Units::ZERO,
            shortages: vec![Shortage::deficit("P1", Decimal::from(2))],
        };
        assert_eq!(err.reason(), "insufficient_stock");
        assert_eq!(err.shortages().len(), 1);
        assert_eq!(err.to_string(), "庫存不足：FG1 需要 3 件，最多可生產 0 件");
    }
}
