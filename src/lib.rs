//! # Craft
//!
//! 多階 BOM 可生產量與組裝引擎
//!
//! - [`craft_core`]：資料模型、配置、資料來源介面
//! - [`craft_calc`]：BOM 樹重建、可生產量計算、成品分類、組裝

pub use craft_calc::*;
pub use craft_core::*;

pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
