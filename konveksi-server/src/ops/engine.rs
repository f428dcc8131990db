//! Pure command engine
//!
//! `decide` turns a command into events against a read-only state and
//! rejects it without side effects; `evolve` folds the events in and never
//! fails. `apply` is the two together, `replay` rebuilds a state from a
//! recorded event stream.

use super::actions::CommandAction;
use super::appliers::apply_event;
use super::state::OpsState;
use super::traits::{CommandContext, CommandHandler, CommandMetadata, OpsResult};
use crate::activity;
use crate::score::ScoreRules;
use shared::activity::ActivityEntry;
use shared::{OpsCommandPayload, OpsEvent};

/// Events a command would produce, or the reason it is rejected
pub fn decide(
    state: &OpsState,
    rules: &ScoreRules,
    metadata: &CommandMetadata,
    payload: &OpsCommandPayload,
) -> OpsResult<Vec<OpsEvent>> {
    let mut ctx = CommandContext::new(state, rules);
    CommandAction::from(payload).execute(&mut ctx, metadata)
}

/// Apply the events of one command and append its activity entry
pub fn evolve(state: &mut OpsState, events: &[OpsEvent]) -> Option<ActivityEntry> {
    for event in events {
        apply_event(state, event);
        state.sequence = event.sequence;
        state.updated_at = state.updated_at.max(event.timestamp);
    }
    let entry = activity::summarize(events)?;
    state.activity.push(entry.clone());
    Some(entry)
}

/// decide + evolve
pub fn apply(
    state: &mut OpsState,
    rules: &ScoreRules,
    metadata: &CommandMetadata,
    payload: &OpsCommandPayload,
) -> OpsResult<(Vec<OpsEvent>, Option<ActivityEntry>)> {
    let events = decide(state, rules, metadata, payload)?;
    let entry = evolve(state, &events);
    Ok((events, entry))
}

/// Rebuild a state from `initial` plus an event stream
///
/// Events at or below the initial sequence are already part of `initial`
/// and are skipped. Consecutive events of one command are evolved together
/// so the activity trail matches the live run.
pub fn replay(initial: OpsState, events: &[OpsEvent]) -> OpsState {
    let mut state = initial;
    let start = events.partition_point(|e| e.sequence <= state.sequence);
    for batch in events[start..].chunk_by(|a, b| a.command_id == b.command_id) {
        evolve(&mut state, batch);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::traits::OpsError;
    use rust_decimal::Decimal;
    use shared::activity::ActivityType;
    use shared::inventory::{BatchMode, Movement, MovementKind, StockCategory};

    fn metadata(command_id: &str, timestamp: i64) -> CommandMetadata {
        CommandMetadata {
            command_id: command_id.to_string(),
            actor_id: "gudang".to_string(),
            actor_name: "Gudang".to_string(),
            timestamp,
            client_timestamp: None,
        }
    }

    fn register(sku: &str, initial_stock: i64) -> OpsCommandPayload {
        OpsCommandPayload::RegisterItem {
            sku: sku.to_string(),
            name: format!("Kain {}", sku),
            category: StockCategory::RawMaterial,
            unit_cost: Decimal::from(25_000),
            selling_price: Decimal::ZERO,
            initial_stock,
        }
    }

    fn run(commands: &[(&str, OpsCommandPayload)]) -> (OpsState, Vec<OpsEvent>) {
        let rules = ScoreRules::default();
        let mut state = OpsState::new();
        let mut log = Vec::new();
        for (i, (id, payload)) in commands.iter().enumerate() {
            let (events, _) =
                apply(&mut state, &rules, &metadata(id, 1_000 + i as i64), payload).unwrap();
            log.extend(events);
        }
        (state, log)
    }

    #[test]
    fn test_rejected_command_leaves_state_untouched() {
        let (mut state, _) = run(&[("c1", register("M1", 10))]);
        let before = state.clone();
        let err = apply(
            &mut state,
            &ScoreRules::default(),
            &metadata("c2", 2_000),
            &register("M1", 0),
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::Ledger(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_evolve_tracks_sequence_and_activity() {
        let (state, events) = run(&[
            ("c1", register("M1", 0)),
            (
                "c2",
                OpsCommandPayload::ApplyMovements {
                    movements: vec![
                        Movement::new("M1", 100, MovementKind::InboundProduction, "batch 1"),
                        Movement::new("M1", -30, MovementKind::OutboundManual, "cutting"),
                    ],
                    mode: BatchMode::BestEffort,
                },
            ),
        ]);
        assert_eq!(state.sequence, events.last().unwrap().sequence);
        assert_eq!(state.stock.stock_of("M1"), Some(70));
        let after: Vec<i64> = state.stock.ledger().iter().map(|e| e.stock_after).collect();
        assert_eq!(after, vec![100, 70]);

        assert_eq!(state.activity.len(), 2);
        let last = state.activity.last().unwrap();
        assert_eq!(last.activity_type, ActivityType::StockMovement);
        assert_eq!(state.updated_at, 1_001);
    }

    #[test]
    fn test_replay_reproduces_state() {
        let (state, events) = run(&[
            ("c1", register("M1", 40)),
            ("c2", register("M2", 0)),
            (
                "c3",
                OpsCommandPayload::AdjustStock {
                    sku: "M1".to_string(),
                    counted: 37,
                    reason: "stock take".to_string(),
                },
            ),
        ]);
        assert_eq!(replay(OpsState::new(), &events), state);
    }

    #[test]
    fn test_replay_skips_events_already_in_snapshot() {
        let (state, events) = run(&[("c1", register("M1", 5)), ("c2", register("M2", 7))]);
        let (partial, _) = run(&[("c1", register("M1", 5))]);
        assert_eq!(replay(partial, &events), state);
    }
}
