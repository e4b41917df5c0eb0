//! 引擎配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CraftError, Result};

/// 可生產量引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 成品分類時的試算數量
    pub probe_quantity: Decimal,

    /// 缺料百分比每滿此值延後一天
    pub percent_per_extra_day: Decimal,

    /// 最少延後天數
    pub min_extra_days: u32,

    /// 是否保留「無法判定」的成品
    /// - true: 可生產量為 0 且沒有末端缺料的成品列入 indeterminate（預設）
    /// - false: 直接略過，不出現在任何清單
    pub report_indeterminate: bool,

    /// 是否並行評估各成品
    pub parallel_classification: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            probe_quantity: Decimal::ONE,
            percent_per_extra_day: Decimal::TEN,
            min_extra_days: 1,
            report_indeterminate: true,
            parallel_classification: false,
        }
    }
}

impl EngineConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置，未提供的欄位使用預設值
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置試算數量
    pub fn with_probe_quantity(mut self, quantity: Decimal) -> Self {
        self.probe_quantity = quantity;
        self
    }

    /// 建構器模式：設置每延後一天對應的缺料百分比
    pub fn with_percent_per_extra_day(mut self, percent: Decimal) -> Self {
        self.percent_per_extra_day = percent;
        self
    }

    /// 建構器模式：設置最少延後天數
    pub fn with_min_extra_days(mut self, days: u32) -> Self {
        self.min_extra_days = days;
        self
    }

    /// 建構器模式：設置是否保留無法判定的成品
    pub fn with_report_indeterminate(mut self, report: bool) -> Self {
        self.report_indeterminate = report;
        self
    }

    /// 建構器模式：設置是否並行評估
    pub fn with_parallel_classification(mut self, parallel: bool) -> Self {
        self.parallel_classification = parallel;
        self
    }

    /// 檢查配置
    pub fn validate(&self) -> Result<()> {
        if self.probe_quantity <= Decimal::ZERO {
            return Err(CraftError::InvalidConfig(format!(
                "試算數量必須大於 0，目前為 {}",
                self.probe_quantity
            )));
        }

        if self.percent_per_extra_day <= Decimal::ZERO {
            return Err(CraftError::InvalidConfig(format!(
                "每日缺料百分比必須大於 0，目前為 {}",
                self.percent_per_extra_day
            )));
        }

        Ok(())
    }
}
