//! 成品組裝（預覽 / 確認 / 寫入）

use craft_core::{
    AssemblyPlan, AssemblyReceipt, Confirmation, CraftError, InventoryStore, Row, StockUpdate,
};
use rust_decimal::Decimal;

use crate::availability::AvailabilityCalculator;
use crate::tree::TreeBuilder;

/// 組裝執行器
///
/// 預覽只做計算；寫入需要呼叫端另外提供確認。
pub struct AssemblyExecutor;

impl AssemblyExecutor {
    /// 以已取得的閉包資料列計算組裝計劃
    pub fn plan(
        rows: &[Row],
        finished_good_code: &str,
        quantity: u32,
    ) -> craft_core::Result<AssemblyPlan> {
        if quantity == 0 {
            return Err(CraftError::InvalidQuantity(format!(
                "{} 的組裝數量必須大於 0",
                finished_good_code
            )));
        }

        if rows.is_empty() {
            return Err(CraftError::NotFound(finished_good_code.to_string()));
        }

        let requested = Decimal::from(quantity);
        let (index, tree) = TreeBuilder::build(rows, finished_good_code);
        let availability =
            AvailabilityCalculator::new(&tree, &index).max_units(finished_good_code, requested)?;

        if !availability.units.covers(requested) {
            tracing::info!(
                "無法組裝 {} 件 {}，最多可生產 {}，缺料 {} 筆",
                quantity,
                finished_good_code,
                availability.units,
                availability.shortages.len()
            );
            return Err(CraftError::InsufficientStock {
                code: finished_good_code.to_string(),
                requested,
                max_units: availability.units,
                shortages: availability.shortages,
            });
        }

        // 每個物料（含半成品與成品本身）都扣庫存
        let updates = index
            .iter()
            .map(|row| StockUpdate::consume(row, requested))
            .collect::<craft_core::Result<Vec<_>>>()?;

        let plan = AssemblyPlan::new(
            finished_good_code.to_string(),
            quantity,
            availability.units,
            updates,
        );

        tracing::debug!(
            "組裝計劃 {}：{} 件 {}，異動 {} 項物料",
            plan.id,
            quantity,
            finished_good_code,
            plan.updates.len()
        );

        Ok(plan)
    }

    /// 從資料來源取得 BOM 並計算組裝計劃（不寫入）
    pub fn preview<S>(
        store: &S,
        finished_good_code: &str,
        quantity: u32,
    ) -> craft_core::Result<AssemblyPlan>
    where
        S: InventoryStore + ?Sized,
    {
        let rows = store.fetch_bom(finished_good_code)?;
        Self::plan(&rows, finished_good_code, quantity)
    }

    /// 確認後寫入組裝計劃的庫存異動
    ///
    /// 寫入的是絕對值，重複提交同一份計劃結果相同。
    pub fn commit<S>(
        store: &mut S,
        plan: &AssemblyPlan,
        confirmation: Confirmation,
    ) -> craft_core::Result<AssemblyReceipt>
    where
        S: InventoryStore + ?Sized,
    {
        if !confirmation.is_confirmed() {
            tracing::info!("組裝計劃 {} 已取消", plan.id);
            return Err(CraftError::Cancelled(plan.finished_good_code.clone()));
        }

        store.apply_updates(&plan.updates).map_err(|err| match err {
            CraftError::Persistence(_) => err,
            other => CraftError::Persistence(other.to_string()),
        })?;

        tracing::info!(
            "已組裝 {} 件 {}（計劃 {}）",
            plan.quantity,
            plan.finished_good_code,
            plan.id
        );

        Ok(AssemblyReceipt {
            plan_id: plan.id,
            finished_good_code: plan.finished_good_code.clone(),
            quantity: plan.quantity,
            updated_items: plan.updates.len(),
        })
    }

    /// 預覽、詢問確認、寫入
    pub fn assemble<S, F>(
        store: &mut S,
        finished_good_code: &str,
        quantity: u32,
        confirm: F,
    ) -> craft_core::Result<AssemblyReceipt>
    where
        S: InventoryStore + ?Sized,
        F: FnOnce(&AssemblyPlan) -> Confirmation,
    {
        let plan = Self::preview(store, finished_good_code, quantity)?;
        let confirmation = confirm(&plan);
        Self::commit(store, &plan, confirmation)
    }
}
