//! Stock event appliers

use crate::ops::state::OpsState;
use crate::ops::traits::EventApplier;
use shared::{EventPayload, OpsEvent};

/// ItemRegistered applier
pub struct ItemRegisteredApplier;

impl EventApplier for ItemRegisteredApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::ItemRegistered { item } = &event.payload
            && let Err(e) = state.stock.register_item(item.clone())
        {
            tracing::error!(event_id = %event.event_id, error = %e, "ItemRegistered not applied");
        }
    }
}

/// StockMoved applier
pub struct StockMovedApplier;

impl EventApplier for StockMovedApplier {
    fn apply(&self, state: &mut OpsState, event: &OpsEvent) {
        if let EventPayload::StockMoved { entries, .. } = &event.payload {
            state.stock.commit(entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::inventory::{LedgerEntry, MovementKind, StockCategory, StockItem};

    fn event(sequence: u64, payload: EventPayload) -> OpsEvent {
        OpsEvent::new(
            sequence,
            "FG-1".to_string(),
            "u".to_string(),
            "U".to_string(),
            "cmd".to_string(),
            10,
            None,
            payload,
        )
    }

    #[test]
    fn test_register_then_move() {
        let mut state = OpsState::new();
        let item = StockItem {
            sku: "FG-1".to_string(),
            name: "Koko".to_string(),
            category: StockCategory::FinishedGood,
            stock: 0,
            unit_cost: Decimal::ONE,
            selling_price: Decimal::TEN,
            created_at: 10,
        };
        ItemRegisteredApplier.apply(&mut state, &event(1, EventPayload::ItemRegistered { item }));
        StockMovedApplier.apply(
            &mut state,
            &event(
                2,
                EventPayload::StockMoved {
                    entries: vec![LedgerEntry {
                        id: "mv-00000001".to_string(),
                        timestamp: 10,
                        sku: "FG-1".to_string(),
                        item_name: "Koko".to_string(),
                        kind: MovementKind::Initial,
                        delta: 12,
                        stock_after: 12,
                        reason: String::new(),
                        actor_id: "u".to_string(),
                    }],
                    outcomes: vec![],
                },
            ),
        );
        assert_eq!(state.stock.stock_of("FG-1"), Some(12));
        assert_eq!(state.stock.ledger().len(), 1);
    }
}
