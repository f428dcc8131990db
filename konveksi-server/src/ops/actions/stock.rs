//! Stock command handlers
//!
//! Register items, apply raw movement batches, receive production output,
//! record customer returns and reconcile physical counts. All of them only
//! plan against the book; the `StockMoved` applier appends.

use super::{LEDGER_ENTITY, stock_moved};
use crate::inventory::LedgerError;
use crate::ops::traits::{
    CommandContext, CommandHandler, CommandMetadata, OpsError, OpsResult, require_text,
};
use rust_decimal::Decimal;
use shared::inventory::{
    BatchMode, Movement, MovementKind, MovementOutcome, StockCategory, StockItem,
};
use shared::{EventPayload, OpsEvent};

fn non_negative(value: Decimal, field: &str) -> OpsResult<()> {
    if value < Decimal::ZERO {
        return Err(OpsError::Validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

fn positive_quantity(quantity: i64) -> OpsResult<()> {
    if quantity <= 0 {
        return Err(OpsError::Validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    Ok(())
}

/// Register a new item and the entry for a new item's first stock
fn register_with_opening(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    item: StockItem,
    opening: Option<Movement>,
) -> OpsResult<Vec<OpsEvent>> {
    let book = &ctx.state().stock;
    if book.contains(&item.sku) {
        return Err(LedgerError::DuplicateSku(item.sku).into());
    }
    let entry = match &opening {
        Some(movement) => Some(book.plan_first_entry(&item, movement, &ctx.stamp(metadata))?),
        None => None,
    };

    let sku = item.sku.clone();
    let mut events = vec![ctx.event(metadata, &sku, EventPayload::ItemRegistered { item })];
    if let Some(entry) = entry {
        let outcomes = vec![MovementOutcome::Applied {
            sku: sku.clone(),
            entry_id: entry.id.clone(),
            stock_after: entry.stock_after,
        }];
        events.push(ctx.event(
            metadata,
            &sku,
            EventPayload::StockMoved {
                entries: vec![entry],
                outcomes,
            },
        ));
    }
    Ok(events)
}

/// RegisterItem action
#[derive(Debug, Clone)]
pub struct RegisterItemAction {
    pub sku: String,
    pub name: String,
    pub category: StockCategory,
    pub unit_cost: Decimal,
    pub selling_price: Decimal,
    pub initial_stock: i64,
}

impl CommandHandler for RegisterItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.sku, "sku")?;
        require_text(&self.name, "name")?;
        non_negative(self.unit_cost, "unit_cost")?;
        non_negative(self.selling_price, "selling_price")?;

        let item = StockItem {
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            stock: 0,
            unit_cost: self.unit_cost,
            selling_price: self.selling_price,
            created_at: metadata.timestamp,
        };
        let opening = (self.initial_stock != 0).then(|| {
            Movement::new(
                item.sku.clone(),
                self.initial_stock,
                MovementKind::Initial,
                "Opening stock",
            )
        });
        register_with_opening(ctx, metadata, item, opening)
    }
}

/// ApplyMovements action
#[derive(Debug, Clone)]
pub struct ApplyMovementsAction {
    pub movements: Vec<Movement>,
    pub mode: BatchMode,
}

impl CommandHandler for ApplyMovementsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        if let Some(m) = self.movements.iter().find(|m| m.kind == MovementKind::Initial) {
            return Err(OpsError::Validation(format!(
                "initial movement for {} is only recorded at registration",
                m.sku
            )));
        }

        let plan =
            ctx.state()
                .stock
                .plan_movements(&self.movements, self.mode, &ctx.stamp(metadata))?;

        let first = self.movements.first().map(|m| m.sku.as_str());
        let entity = match first {
            Some(sku) if self.movements.iter().all(|m| m.sku == sku) => sku,
            _ => LEDGER_ENTITY,
        };
        Ok(vec![stock_moved(ctx, metadata, entity, plan)])
    }
}

/// ReceiveProduction action
///
/// Finished goods from the production floor. The first receipt of an
/// unknown SKU registers it as a finished good, which needs a name.
#[derive(Debug, Clone)]
pub struct ReceiveProductionAction {
    pub sku: String,
    pub name: Option<String>,
    pub quantity: i64,
    pub unit_cost: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub batch_ref: Option<String>,
}

impl CommandHandler for ReceiveProductionAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.sku, "sku")?;
        positive_quantity(self.quantity)?;

        let reason = match &self.batch_ref {
            Some(batch) => format!("Production batch {}", batch),
            None => "Production receipt".to_string(),
        };
        let movement = Movement::new(
            self.sku.clone(),
            self.quantity,
            MovementKind::InboundProduction,
            reason,
        );

        if ctx.state().stock.contains(&self.sku) {
            let plan = ctx.state().stock.plan_movements(
                std::slice::from_ref(&movement),
                BatchMode::AllOrNothing,
                &ctx.stamp(metadata),
            )?;
            return Ok(vec![stock_moved(ctx, metadata, &self.sku, plan)]);
        }

        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                OpsError::Validation(format!("name is required to register new SKU {}", self.sku))
            })?;
        let unit_cost = self.unit_cost.unwrap_or(Decimal::ZERO);
        let selling_price = self.selling_price.unwrap_or(Decimal::ZERO);
        non_negative(unit_cost, "unit_cost")?;
        non_negative(selling_price, "selling_price")?;

        let item = StockItem {
            sku: self.sku.clone(),
            name: name.trim().to_string(),
            category: StockCategory::FinishedGood,
            stock: 0,
            unit_cost,
            selling_price,
            created_at: metadata.timestamp,
        };
        register_with_opening(ctx, metadata, item, Some(movement))
    }
}

/// RecordReturn action
#[derive(Debug, Clone)]
pub struct RecordReturnAction {
    pub sku: String,
    pub quantity: i64,
    pub reason: String,
}

impl CommandHandler for RecordReturnAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        positive_quantity(self.quantity)?;
        require_text(&self.reason, "reason")?;

        let movement = Movement::new(
            self.sku.clone(),
            self.quantity,
            MovementKind::InboundReturn,
            self.reason.clone(),
        );
        let plan = ctx.state().stock.plan_movements(
            &[movement],
            BatchMode::AllOrNothing,
            &ctx.stamp(metadata),
        )?;
        Ok(vec![stock_moved(ctx, metadata, &self.sku, plan)])
    }
}

/// AdjustStock action
///
/// Records `counted - current` as an adjustment. A zero delta is still
/// recorded so the count itself shows up in the ledger.
#[derive(Debug, Clone)]
pub struct AdjustStockAction {
    pub sku: String,
    pub counted: i64,
    pub reason: String,
}

impl CommandHandler for AdjustStockAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> OpsResult<Vec<OpsEvent>> {
        require_text(&self.reason, "reason")?;
        let current = ctx
            .state()
            .stock
            .stock_of(&self.sku)
            .ok_or_else(|| OpsError::SkuNotFound(self.sku.clone()))?;

        let delta = self
            .counted
            .checked_sub(current)
            .ok_or_else(|| LedgerError::StockOverflow {
                sku: self.sku.clone(),
                current,
                delta: self.counted,
            })?;

        let movement = Movement::new(
            self.sku.clone(),
            delta,
            MovementKind::Adjustment,
            self.reason.clone(),
        );
        let plan = ctx.state().stock.plan_movements(
            &[movement],
            BatchMode::AllOrNothing,
            &ctx.stamp(metadata),
        )?;
        Ok(vec![stock_moved(ctx, metadata, &self.sku, plan)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::actions::test_support::{metadata, stocked_state};
    use crate::score::ScoreRules;

    fn run(
        state: &crate::ops::state::OpsState,
        action: impl CommandHandler,
    ) -> OpsResult<Vec<OpsEvent>> {
        let rules = ScoreRules::default();
        let mut ctx = CommandContext::new(state, &rules);
        action.execute(&mut ctx, &metadata())
    }

    fn entries(event: &OpsEvent) -> Vec<(String, i64, i64)> {
        match &event.payload {
            EventPayload::StockMoved { entries, .. } => entries
                .iter()
                .map(|e| (e.sku.clone(), e.delta, e.stock_after))
                .collect(),
            other => panic!("expected StockMoved, got {:?}", other),
        }
    }

    #[test]
    fn test_register_with_opening_stock() {
        let state = stocked_state(&[]);
        let events = run(
            &state,
            RegisterItemAction {
                sku: "KAIN-TOYOBO".to_string(),
                name: "Kain Toyobo".to_string(),
                category: StockCategory::RawMaterial,
                unit_cost: Decimal::from(28_000),
                selling_price: Decimal::ZERO,
                initial_stock: 120,
            },
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert!(matches!(events[0].payload, EventPayload::ItemRegistered { .. }));
        assert_eq!(entries(&events[1]), vec![("KAIN-TOYOBO".to_string(), 120, 120)]);
        // Deciding never mutates
        assert!(state.stock.items().is_empty());
    }

    #[test]
    fn test_register_duplicate() {
        let state = stocked_state(&[("FG-1", 0)]);
        let err = run(
            &state,
            RegisterItemAction {
                sku: "FG-1".to_string(),
                name: "Dup".to_string(),
                category: StockCategory::FinishedGood,
                unit_cost: Decimal::ONE,
                selling_price: Decimal::ONE,
                initial_stock: 0,
            },
        )
        .unwrap_err();
        assert_eq!(err, OpsError::Ledger(LedgerError::DuplicateSku("FG-1".to_string())));
    }

    #[test]
    fn test_apply_movements_rejects_initial_kind() {
        let state = stocked_state(&[("M1", 0)]);
        let err = run(
            &state,
            ApplyMovementsAction {
                movements: vec![Movement::new("M1", 5, MovementKind::Initial, "")],
                mode: BatchMode::BestEffort,
            },
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }

    #[test]
    fn test_apply_movements_running_snapshots() {
        let state = stocked_state(&[("M1", 0)]);
        let events = run(
            &state,
            ApplyMovementsAction {
                movements: vec![
                    Movement::new("M1", 100, MovementKind::InboundProduction, ""),
                    Movement::new("M1", -30, MovementKind::OutboundManual, ""),
                ],
                mode: BatchMode::BestEffort,
            },
        )
        .unwrap();
        assert_eq!(events[0].entity_id, "M1");
        let after: Vec<i64> = entries(&events[0]).into_iter().map(|e| e.2).collect();
        assert_eq!(after, vec![100, 70]);
    }

    #[test]
    fn test_receive_production_registers_new_finished_good() {
        let state = stocked_state(&[]);
        let events = run(
            &state,
            ReceiveProductionAction {
                sku: "FG-KOKO-XL".to_string(),
                name: Some("Koko XL".to_string()),
                quantity: 36,
                unit_cost: None,
                selling_price: Some(Decimal::from(135_000)),
                batch_ref: Some("B-07".to_string()),
            },
        )
        .unwrap();
        match &events[0].payload {
            EventPayload::ItemRegistered { item } => {
                assert_eq!(item.category, StockCategory::FinishedGood);
                assert_eq!(item.stock, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(entries(&events[1]), vec![("FG-KOKO-XL".to_string(), 36, 36)]);

        let err = run(
            &state,
            ReceiveProductionAction {
                sku: "FG-NAMELESS".to_string(),
                name: None,
                quantity: 1,
                unit_cost: None,
                selling_price: None,
                batch_ref: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }

    #[test]
    fn test_receive_production_existing_item() {
        let state = stocked_state(&[("FG-1", 4)]);
        let events = run(
            &state,
            ReceiveProductionAction {
                sku: "FG-1".to_string(),
                name: None,
                quantity: 6,
                unit_cost: None,
                selling_price: None,
                batch_ref: None,
            },
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(entries(&events[0]), vec![("FG-1".to_string(), 6, 10)]);
    }

    #[test]
    fn test_return_needs_known_sku() {
        let state = stocked_state(&[]);
        let err = run(
            &state,
            RecordReturnAction {
                sku: "FG-X".to_string(),
                quantity: 1,
                reason: "wrong size".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.code(), shared::error::ErrorCode::SkuNotFound);
    }

    #[test]
    fn test_adjust_records_difference() {
        let state = stocked_state(&[("FG-1", 10)]);
        let events = run(
            &state,
            AdjustStockAction {
                sku: "FG-1".to_string(),
                counted: 7,
                reason: "stock opname".to_string(),
            },
        )
        .unwrap();
        assert_eq!(entries(&events[0]), vec![("FG-1".to_string(), -3, 7)]);

        let err = run(
            &state,
            AdjustStockAction {
                sku: "NOPE".to_string(),
                counted: 1,
                reason: "count".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, OpsError::SkuNotFound("NOPE".to_string()));
    }

    #[test]
    fn test_adjust_rejects_unrepresentable_difference() {
        let state = stocked_state(&[("FG-1", 10)]);
        let err = run(
            &state,
            AdjustStockAction {
                sku: "FG-1".to_string(),
                counted: i64::MIN,
                reason: "salah ketik".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::Ledger(LedgerError::StockOverflow { .. })));
        assert_eq!(err.code(), shared::error::ErrorCode::InvalidMovement);
    }

    #[test]
    fn test_apply_movements_rejects_overflow() {
        let state = stocked_state(&[("FG-1", 10)]);
        let err = run(
            &state,
            ApplyMovementsAction {
                movements: vec![Movement::new(
                    "FG-1",
                    i64::MAX,
                    MovementKind::InboundProduction,
                    "",
                )],
                mode: BatchMode::AllOrNothing,
            },
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::Ledger(LedgerError::StockOverflow { .. })));
        assert_eq!(state.stock.stock_of("FG-1"), Some(10));
    }
}
