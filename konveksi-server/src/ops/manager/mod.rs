//! OpsManager - single writer for the operations state
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Lock state
//!     ├─ 2. Idempotency check (command_id)
//!     ├─ 3. Stamp metadata with server time
//!     ├─ 4. decide: convert command to action and execute
//!     ├─ 5. evolve: apply events, append activity entry
//!     ├─ 6. Mark command processed
//!     ├─ 7. Unlock, mirror activity to the audit log
//!     ├─ 8. Broadcast event(s)
//!     └─ 9. Return response
//! ```
//!
//! A rejected command returns at step 4 and leaves nothing behind.

mod error;
pub use error::*;

use super::engine;
use super::state::OpsState;
use super::traits::CommandMetadata;
use crate::activity;
use crate::inventory::{ChainVerification, verify_chain};
use crate::score::ScoreRules;
use parking_lot::Mutex;
use shared::inventory::MovementOutcome;
use shared::ops::{CommandResponse, OpsCommand};
use shared::{EventPayload, OpsEvent};
use std::collections::{HashSet, VecDeque};
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// How many recent command ids are remembered for idempotency
const PROCESSED_COMMAND_CAPACITY: usize = 10_000;

/// Recently processed command ids, oldest forgotten first
#[derive(Debug, Default)]
struct ProcessedCommands {
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl ProcessedCommands {
    fn contains(&self, command_id: &str) -> bool {
        self.ids.contains(command_id)
    }

    fn insert(&mut self, command_id: String) {
        if !self.ids.insert(command_id.clone()) {
            return;
        }
        self.order.push_back(command_id);
        if self.order.len() > PROCESSED_COMMAND_CAPACITY
            && let Some(oldest) = self.order.pop_front()
        {
            self.ids.remove(&oldest);
        }
    }
}

struct Inner {
    state: OpsState,
    processed: ProcessedCommands,
}

/// OpsManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct OpsManager {
    inner: Mutex<Inner>,
    rules: ScoreRules,
    activity_capacity: usize,
    event_tx: broadcast::Sender<OpsEvent>,
    epoch: String,
}

impl std::fmt::Debug for OpsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsManager")
            .field("rules", &self.rules)
            .field("activity_capacity", &self.activity_capacity)
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OpsManager {
    /// Create a manager over an empty state
    pub fn new(rules: ScoreRules, activity_capacity: usize) -> Self {
        Self::with_state(
            OpsState::with_activity_capacity(activity_capacity),
            rules,
            activity_capacity,
        )
    }

    fn with_state(state: OpsState, rules: ScoreRules, activity_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, sequence = state.sequence, "OpsManager started with new epoch");
        Self {
            inner: Mutex::new(Inner {
                state,
                processed: ProcessedCommands::default(),
            }),
            rules,
            activity_capacity,
            event_tx,
            epoch,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OpsEvent> {
        self.event_tx.subscribe()
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OpsCommand) -> CommandResponse {
        self.execute_command_with_events(cmd).0
    }

    /// Execute a command and return both the response and generated events
    pub fn execute_command_with_events(&self, cmd: OpsCommand) -> (CommandResponse, Vec<OpsEvent>) {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd) {
            Ok((response, events)) => {
                // Broadcast events after the state is updated
                for event in &events {
                    if self.event_tx.send(event.clone()).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                (response, events)
            }
            Err(err) => {
                tracing::info!(command_id = %command_id, error = %err, "Command rejected");
                (CommandResponse::error(command_id, err.into()), vec![])
            }
        }
    }

    fn process_command(&self, cmd: OpsCommand) -> ManagerResult<(CommandResponse, Vec<OpsEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor_id: cmd.actor_id,
            actor_name: cmd.actor_name,
            timestamp: shared::util::now_millis(),
            client_timestamp: Some(cmd.timestamp),
        };

        let (events, entry) = {
            let mut inner = self.inner.lock();
            if inner.processed.contains(&cmd.command_id) {
                tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
                return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
            }
            let (events, entry) =
                engine::apply(&mut inner.state, &self.rules, &metadata, &cmd.payload)?;
            inner.processed.insert(cmd.command_id.clone());
            (events, entry)
        };

        if let Some(entry) = &entry {
            activity::mirror(entry);
        }

        let outcomes: Vec<MovementOutcome> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::StockMoved { outcomes, .. } => Some(outcomes.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect();
        let entity_id = events.first().map(|e| e.entity_id.clone());

        tracing::debug!(
            command_id = %cmd.command_id,
            event_count = events.len(),
            "Command applied"
        );
        let response = CommandResponse::success(cmd.command_id, entity_id).with_outcomes(outcomes);
        Ok((response, events))
    }

    /// Clone of the whole aggregate
    pub fn snapshot(&self) -> OpsState {
        self.inner.lock().state.clone()
    }

    /// Run a read-only closure against the current state
    pub fn read<R>(&self, f: impl FnOnce(&OpsState) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn current_sequence(&self) -> u64 {
        self.inner.lock().state.sequence
    }

    pub fn verify_ledger(&self) -> ChainVerification {
        self.read(|state| verify_chain(&state.stock))
    }

    /// Replace the state with a restored snapshot
    ///
    /// A snapshot whose ledger does not verify is refused and the current
    /// state is kept.
    pub fn restore(&self, mut state: OpsState) -> ManagerResult<()> {
        let report = verify_chain(&state.stock);
        if !report.is_intact() {
            return Err(ManagerError::CorruptSnapshot(format!(
                "ledger has {} broken links and {} stock mismatches",
                report.breaks.len(),
                report.mismatches.len()
            )));
        }
        state.activity.set_capacity(self.activity_capacity);

        let sequence = state.sequence;
        self.inner.lock().state = state;
        tracing::info!(sequence, "State restored from snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::log::DEFAULT_CAPACITY;
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;
    use shared::inventory::StockCategory;
    use shared::ops::OpsCommandPayload;

    fn manager() -> OpsManager {
        OpsManager::new(ScoreRules::default(), DEFAULT_CAPACITY)
    }

    fn register(sku: &str, initial_stock: i64) -> OpsCommand {
        OpsCommand::new(
            "gudang",
            "Gudang",
            OpsCommandPayload::RegisterItem {
                sku: sku.to_string(),
                name: "Kain katun".to_string(),
                category: StockCategory::RawMaterial,
                unit_cost: Decimal::from(30_000),
                selling_price: Decimal::ZERO,
                initial_stock,
            },
        )
    }

    #[test]
    fn test_execute_reports_outcomes_and_entity() {
        let manager = manager();
        let (response, events) = manager.execute_command_with_events(register("KAIN-1", 25));
        assert!(response.success);
        assert_eq!(response.entity_id.as_deref(), Some("KAIN-1"));
        assert_eq!(response.outcomes.len(), 1);
        assert_eq!(events.len(), 2);
        assert_eq!(manager.current_sequence(), 2);
        assert_eq!(manager.read(|s| s.activity.len()), 1);
    }

    #[test]
    fn test_duplicate_command_is_ignored() {
        let manager = manager();
        let cmd = register("KAIN-1", 5);
        assert!(manager.execute_command(cmd.clone()).success);

        let response = manager.execute_command(cmd);
        assert!(response.duplicate);
        assert_eq!(manager.current_sequence(), 2);
        assert_eq!(manager.read(|s| s.stock.stock_of("KAIN-1")), Some(5));
    }

    #[test]
    fn test_rejected_command_can_be_retried() {
        let manager = manager();
        manager.execute_command(register("KAIN-1", 0));

        let mut cmd = register("KAIN-1", 0);
        cmd.command_id = "retry-me".to_string();
        let response = manager.execute_command(cmd.clone());
        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, ErrorCode::SkuAlreadyExists);

        // Not remembered: the same id is evaluated again, not answered as duplicate
        assert!(!manager.execute_command(cmd).duplicate);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let manager = manager();
        let mut rx = manager.subscribe();
        manager.execute_command(register("KAIN-1", 3));
        assert_eq!(rx.recv().await.unwrap().sequence, 1);
        assert_eq!(rx.recv().await.unwrap().sequence, 2);
    }

    #[test]
    fn test_restore_rejects_broken_ledger() {
        let source = manager();
        source.execute_command(register("KAIN-1", 8));
        let mut snapshot = source.snapshot();

        let target = manager();
        target.restore(snapshot.clone()).unwrap();
        assert_eq!(target.current_sequence(), 2);
        assert!(target.verify_ledger().is_intact());

        let mut json = serde_json::to_value(&snapshot).unwrap();
        json["stock"]["ledger"][0]["stock_after"] = serde_json::json!(9);
        snapshot = serde_json::from_value(json).unwrap();

        let fresh = manager();
        assert!(matches!(
            fresh.restore(snapshot),
            Err(ManagerError::CorruptSnapshot(_))
        ));
        assert_eq!(fresh.current_sequence(), 0);
    }
}
