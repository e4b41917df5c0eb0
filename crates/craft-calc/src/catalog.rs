//! 成品可生產性分類

use chrono::{Days, NaiveDate};
use craft_core::{
    closure_rows, CraftError, EngineConfig, InventoryStore, Row, Shortage, ShortageKind, Units,
};
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::availability::AvailabilityCalculator;
use crate::tree::{BomTree, ItemIndex, TreeBuilder};

/// 可生產的成品
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftableGood {
    pub finished_good_code: String,
    pub max_units: Units,
}

/// 無法生產的成品
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonCraftableGood {
    /// 成品代碼
    pub finished_good_code: String,

    /// 缺料的末端物料（缺料順序）
    pub missing_items: Vec<String>,

    /// 平均缺料百分比（0 ~ 100）
    pub missing_percentage: Decimal,

    /// 預計可出貨日期
    pub estimated_date: NaiveDate,
}

/// 單一成品的分類結果
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Craftable(CraftableGood),
    NonCraftable(NonCraftableGood),
    /// 可生產量為 0 但沒有末端缺料
    Indeterminate(String),
}

/// 成品分類報表
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogReport {
    pub craftable: Vec<CraftableGood>,
    pub non_craftable: Vec<NonCraftableGood>,
    pub indeterminate: Vec<String>,
}

/// 成品分類器
#[derive(Default)]
pub struct CatalogClassifier {
    config: EngineConfig,
}

impl CatalogClassifier {
    /// 創建分類器（配置不合法時回傳錯誤）
    pub fn new(config: EngineConfig) -> craft_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 以今天日期分類全部成品
    pub fn classify(&self, all_rows: &[Row]) -> craft_core::Result<CatalogReport> {
        self.classify_on(all_rows, chrono::Local::now().date_naive())
    }

    /// 從資料來源取得快照後分類
    pub fn classify_store<S>(&self, store: &S, today: NaiveDate) -> craft_core::Result<CatalogReport>
    where
        S: InventoryStore + ?Sized,
    {
        let all_rows = store.fetch_all()?;
        self.classify_on(&all_rows, today)
    }

    /// 分類全部成品，預計日期以 `today` 起算
    pub fn classify_on(
        &self,
        all_rows: &[Row],
        today: NaiveDate,
    ) -> craft_core::Result<CatalogReport> {
        let codes = finished_good_codes(all_rows);

        tracing::info!(
            "開始成品分類：資料 {} 筆，成品 {} 個",
            all_rows.len(),
            codes.len()
        );
        let start_time = std::time::Instant::now();

        let verdicts: Vec<Verdict> = if self.config.parallel_classification {
            codes
                .par_iter()
                .map(|code| self.evaluate_isolated(all_rows, code, today))
                .collect::<craft_core::Result<_>>()?
        } else {
            codes
                .iter()
                .map(|code| self.evaluate_isolated(all_rows, code, today))
                .collect::<craft_core::Result<_>>()?
        };

        let mut report = CatalogReport::default();
        for verdict in verdicts {
            match verdict {
                Verdict::Craftable(good) => report.craftable.push(good),
                Verdict::NonCraftable(good) => report.non_craftable.push(good),
                Verdict::Indeterminate(code) => {
                    if self.config.report_indeterminate {
                        report.indeterminate.push(code);
                    } else {
                        tracing::debug!("成品 {} 無法判定，略過", code);
                    }
                }
            }
        }

        tracing::info!(
            "成品分類完成，耗時 {:?}：可生產 {}，無法生產 {}，無法判定 {}",
            start_time.elapsed(),
            report.craftable.len(),
            report.non_craftable.len(),
            report.indeterminate.len()
        );

        Ok(report)
    }

    /// 評估單一成品
    pub fn evaluate(
        &self,
        all_rows: &[Row],
        finished_good_code: &str,
        today: NaiveDate,
    ) -> craft_core::Result<Verdict> {
        let (index, tree) = explode_good(all_rows, finished_good_code);
        let availability = AvailabilityCalculator::new(&tree, &index)
            .max_units(finished_good_code, self.config.probe_quantity)?;

        // 只有沒有子件的缺料會直接阻擋生產
        let leaf_shortages: Vec<&Shortage> = availability
            .shortages
            .iter()
            .filter(|shortage| !tree.has_children(&shortage.item_code))
            .collect();

        if !leaf_shortages.is_empty() {
            let good = self.non_craftable(finished_good_code, &leaf_shortages, &index, today)?;
            tracing::debug!(
                "成品 {} 無法生產：缺料 {:?}，缺料百分比 {}",
                finished_good_code,
                good.missing_items,
                good.missing_percentage
            );
            return Ok(Verdict::NonCraftable(good));
        }

        if !availability.units.is_zero() {
            tracing::debug!(
                "成品 {} 可生產 {}",
                finished_good_code,
                availability.units
            );
            return Ok(Verdict::Craftable(CraftableGood {
                finished_good_code: finished_good_code.to_string(),
                max_units: availability.units,
            }));
        }

        Ok(Verdict::Indeterminate(finished_good_code.to_string()))
    }

    /// 評估單一成品，計算錯誤只影響該成品
    fn evaluate_isolated(
        &self,
        all_rows: &[Row],
        finished_good_code: &str,
        today: NaiveDate,
    ) -> craft_core::Result<Verdict> {
        match self.evaluate(all_rows, finished_good_code, today) {
            Err(CraftError::Calculation(message)) => {
                tracing::warn!(
                    "成品 {} 計算失敗，列為無法判定: {}",
                    finished_good_code,
                    message
                );
                Ok(Verdict::Indeterminate(finished_good_code.to_string()))
            }
            result => result,
        }
    }

    fn non_craftable(
        &self,
        finished_good_code: &str,
        leaf_shortages: &[&Shortage],
        index: &ItemIndex,
        today: NaiveDate,
    ) -> craft_core::Result<NonCraftableGood> {
        let percentages: Vec<Decimal> = leaf_shortages
            .iter()
            .map(|shortage| shortage_percentage(shortage, index))
            .collect();

        let average = if percentages.is_empty() {
            Decimal::ONE_HUNDRED
        } else {
            percentages.iter().sum::<Decimal>() / Decimal::from(percentages.len())
        };

        let extra_days = self.extra_days(average);
        let estimated_date = today
            .checked_add_days(Days::new(u64::from(extra_days)))
            .ok_or_else(|| {
                CraftError::InvalidDate(format!("{} 加 {} 天超出日期範圍", today, extra_days))
            })?;

        Ok(NonCraftableGood {
            finished_good_code: finished_good_code.to_string(),
            missing_items: leaf_shortages
                .iter()
                .map(|shortage| shortage.item_code.clone())
                .collect(),
            missing_percentage: average,
            estimated_date,
        })
    }

    /// 延後天數 = max(最少天數, floor(平均缺料百分比 / 每日百分比))
    fn extra_days(&self, average_percentage: Decimal) -> u32 {
        let days = (average_percentage / self.config.percent_per_extra_day)
            .floor()
            .to_u32()
            .unwrap_or(0);
        days.max(self.config.min_extra_days)
    }
}

/// 依首次出現順序列出不重複的成品代碼
pub fn finished_good_codes(all_rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    all_rows
        .iter()
        .filter(|row| seen.insert(row.finished_good_code.as_str()))
        .map(|row| row.finished_good_code.clone())
        .collect()
}

/// 缺料百分比 = 缺量 / (缺量 + 現有庫存) × 100，沒有庫存時為 100
pub fn missing_percentage(deficit: Decimal, on_hand: Decimal) -> Decimal {
    if on_hand > Decimal::ZERO {
        deficit / (deficit + on_hand) * Decimal::ONE_HUNDRED
    } else {
        Decimal::ONE_HUNDRED
    }
}

fn shortage_percentage(shortage: &Shortage, index: &ItemIndex) -> Decimal {
    match (&shortage.kind, index.get(&shortage.item_code)) {
        (ShortageKind::Deficit(deficit), Some(row)) => missing_percentage(*deficit, row.on_hand_qty),
        // 未知物料或循環視為完全缺料
        _ => Decimal::ONE_HUNDRED,
    }
}

impl fmt::Display for CatalogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "無法生產的成品（缺少末端物料）:")?;
        if self.non_craftable.is_empty() {
            writeln!(f, "  所有成品皆有生產可能。")?;
        }
        for good in &self.non_craftable {
            writeln!(
                f,
                "  成品: {} | 缺料: {}",
                good.finished_good_code,
                good.missing_items.join(", ")
            )?;
            writeln!(f, "    - 缺料百分比: {:.2}%", good.missing_percentage)?;
            writeln!(
                f,
                "    - 預計出貨日期: {}",
                good.estimated_date.format("%d-%m-%Y")
            )?;
        }

        writeln!(f, "可生產的成品:")?;
        if self.craftable.is_empty() {
            writeln!(f, "  目前沒有可生產的成品。")?;
        }
        for good in &self.craftable {
            writeln!(
                f,
                "  成品: {} | 最大可生產量: {}",
                good.finished_good_code, good.max_units
            )?;
        }

        if !self.indeterminate.is_empty() {
            writeln!(f, "無法判定的成品:")?;
            for code in &self.indeterminate {
                writeln!(f, "  成品: {}", code)?;
            }
        }

        Ok(())
    }
}

/// 取出成品的閉包資料列並重建物料索引與 BOM 樹
pub fn explode_good(all_rows: &[Row], finished_good_code: &str) -> (ItemIndex, BomTree) {
    TreeBuilder::build(&closure_rows(all_rows, finished_good_code), finished_good_code)
}
