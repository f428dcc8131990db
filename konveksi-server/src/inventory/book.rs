//! StockBook - arena store for stock items and the append-only ledger
//!
//! Items live in a `Vec` addressed by index; a `sku → index` map covers both
//! stock categories. The ledger is a single `Vec<LedgerEntry>` in append
//! order. Stock is only ever changed by appending an entry.
//!
//! # Applying movements
//!
//! ```text
//! plan_movements(batch)   read-only: resolves SKUs, computes running
//!        │                 stock_after per entry, collects outcomes
//!        ▼
//! commit(entries)         appends entries, sets item.stock = stock_after
//! ```
//!
//! `apply_movements` runs both steps. The command engine runs them in two
//! phases so a rejected command never touches the book.

use serde::{Deserialize, Serialize};
use shared::inventory::{
    BatchMode, LedgerEntry, Movement, MovementKind, MovementOutcome, StockItem,
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Movement batch is empty")]
    EmptyBatch,

    #[error("Unknown SKU(s): {}", .0.join(", "))]
    UnknownSku(Vec<String>),

    #[error("SKU already registered: {0}")]
    DuplicateSku(String),

    #[error("Movement {index} ({sku}): {kind} does not accept delta {delta}")]
    InvalidMovement {
        index: usize,
        sku: String,
        kind: MovementKind,
        delta: i64,
    },

    #[error("Stock of {sku} would overflow ({current} {delta:+})")]
    StockOverflow { sku: String, current: i64, delta: i64 },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Who and when, stamped onto every entry of a batch
#[derive(Debug, Clone)]
pub struct MovementStamp {
    pub timestamp: i64,
    pub actor_id: String,
}

impl MovementStamp {
    pub fn new(timestamp: i64, actor_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            actor_id: actor_id.into(),
        }
    }
}

/// Entries and outcomes of a batch that has not been committed yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementPlan {
    pub entries: Vec<LedgerEntry>,
    pub outcomes: Vec<MovementOutcome>,
}

impl MovementPlan {
    /// Stock after the batch, per touched SKU
    pub fn updated_stock(&self) -> BTreeMap<String, i64> {
        self.entries
            .iter()
            .map(|e| (e.sku.clone(), e.stock_after))
            .collect()
    }
}

/// Result of `apply_movements`
#[derive(Debug, Clone, PartialEq)]
pub struct MovementReport {
    pub updated_stock: BTreeMap<String, i64>,
    pub appended: Vec<LedgerEntry>,
    pub outcomes: Vec<MovementOutcome>,
}

/// Serialized form; the index is rebuilt on load
#[derive(Serialize, Deserialize)]
struct StockBookData {
    items: Vec<StockItem>,
    ledger: Vec<LedgerEntry>,
}

/// Stock items + ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StockBookData", into = "StockBookData")]
pub struct StockBook {
    items: Vec<StockItem>,
    ledger: Vec<LedgerEntry>,
    index: HashMap<String, usize>,
}

impl From<StockBookData> for StockBook {
    fn from(data: StockBookData) -> Self {
        let index = data
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.sku.clone(), i))
            .collect();
        Self {
            items: data.items,
            ledger: data.ledger,
            index,
        }
    }
}

impl From<StockBook> for StockBookData {
    fn from(book: StockBook) -> Self {
        Self {
            items: book.items,
            ledger: book.ledger,
        }
    }
}

impl StockBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Reads ==========

    pub fn item(&self, sku: &str) -> Option<&StockItem> {
        self.index.get(sku).map(|&i| &self.items[i])
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.index.contains_key(sku)
    }

    pub fn stock_of(&self, sku: &str) -> Option<i64> {
        self.item(sku).map(|item| item.stock)
    }

    /// Items in registration order
    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    /// Whole ledger in append order
    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    pub fn entries_for<'a>(
        &'a self,
        sku: &'a str,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.ledger.iter().filter(move |e| e.sku == sku)
    }

    /// Next ledger entry id, `offset` entries ahead of the current end
    fn entry_id(&self, offset: usize) -> String {
        format!("mv-{:08}", self.ledger.len() + offset + 1)
    }

    // ========== Writes ==========

    /// Add a new item with zero stock
    ///
    /// Opening balances go through an `initial` movement so the ledger
    /// chain starts at zero for every SKU.
    pub fn register_item(&mut self, mut item: StockItem) -> LedgerResult<()> {
        if self.contains(&item.sku) {
            return Err(LedgerError::DuplicateSku(item.sku));
        }
        item.stock = 0;
        self.index.insert(item.sku.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Resolve a batch without mutating the book
    ///
    /// Movements on the same SKU see each other's running stock. In
    /// `AllOrNothing` mode any unknown SKU rejects the whole batch; in
    /// `BestEffort` mode unknown SKUs become `Skipped` outcomes.
    pub fn plan_movements(
        &self,
        movements: &[Movement],
        mode: BatchMode,
        stamp: &MovementStamp,
    ) -> LedgerResult<MovementPlan> {
        if movements.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }

        for (index, m) in movements.iter().enumerate() {
            if !m.kind.accepts(m.delta) {
                return Err(LedgerError::InvalidMovement {
                    index,
                    sku: m.sku.clone(),
                    kind: m.kind,
                    delta: m.delta,
                });
            }
        }

        if mode == BatchMode::AllOrNothing {
            let mut missing: Vec<String> = movements
                .iter()
                .filter(|m| !self.contains(&m.sku))
                .map(|m| m.sku.clone())
                .collect();
            if !missing.is_empty() {
                missing.sort();
                missing.dedup();
                return Err(LedgerError::UnknownSku(missing));
            }
        }

        let mut running: HashMap<usize, i64> = HashMap::new();
        let mut plan = MovementPlan::default();

        for m in movements {
            let Some(&idx) = self.index.get(&m.sku) else {
                plan.outcomes.push(MovementOutcome::Skipped {
                    sku: m.sku.clone(),
                    reason: format!("unknown SKU {}", m.sku),
                });
                continue;
            };

            let item = &self.items[idx];
            let current = running.get(&idx).copied().unwrap_or(item.stock);
            let stock_after = current
                .checked_add(m.delta)
                .ok_or_else(|| LedgerError::StockOverflow {
                    sku: m.sku.clone(),
                    current,
                    delta: m.delta,
                })?;
            if stock_after < 0 {
                tracing::warn!(
                    sku = %m.sku,
                    stock_after,
                    kind = %m.kind,
                    "Movement drives stock negative"
                );
            }
            running.insert(idx, stock_after);

            let entry = LedgerEntry {
                id: self.entry_id(plan.entries.len()),
                timestamp: stamp.timestamp,
                sku: m.sku.clone(),
                item_name: item.name.clone(),
                kind: m.kind,
                delta: m.delta,
                stock_after,
                reason: m.reason.clone(),
                actor_id: stamp.actor_id.clone(),
            };
            plan.outcomes.push(MovementOutcome::Applied {
                sku: m.sku.clone(),
                entry_id: entry.id.clone(),
                stock_after,
            });
            plan.entries.push(entry);
        }

        Ok(plan)
    }

    /// First entry for an item that is about to be registered
    ///
    /// Registration and the opening movement travel as two events; the
    /// entry is planned here because `plan_movements` only sees known SKUs.
    pub fn plan_first_entry(
        &self,
        item: &StockItem,
        movement: &Movement,
        stamp: &MovementStamp,
    ) -> LedgerResult<LedgerEntry> {
        if self.contains(&item.sku) {
            return Err(LedgerError::DuplicateSku(item.sku.clone()));
        }
        if !movement.kind.accepts(movement.delta) {
            return Err(LedgerError::InvalidMovement {
                index: 0,
                sku: movement.sku.clone(),
                kind: movement.kind,
                delta: movement.delta,
            });
        }
        Ok(LedgerEntry {
            id: self.entry_id(0),
            timestamp: stamp.timestamp,
            sku: item.sku.clone(),
            item_name: item.name.clone(),
            kind: movement.kind,
            delta: movement.delta,
            stock_after: movement.delta,
            reason: movement.reason.clone(),
            actor_id: stamp.actor_id.clone(),
        })
    }

    /// Append planned entries
    ///
    /// Entries for SKUs the book does not know are dropped with an error
    /// log; a plan produced by `plan_movements` on this book never has any.
    pub fn commit(&mut self, entries: &[LedgerEntry]) {
        for entry in entries {
            let Some(&idx) = self.index.get(&entry.sku) else {
                tracing::error!(sku = %entry.sku, entry_id = %entry.id, "Ledger entry for unknown SKU dropped");
                continue;
            };
            self.items[idx].stock = entry.stock_after;
            self.ledger.push(entry.clone());
        }
    }

    /// Plan and commit in one step
    pub fn apply_movements(
        &mut self,
        movements: &[Movement],
        mode: BatchMode,
        stamp: &MovementStamp,
    ) -> LedgerResult<MovementReport> {
        let plan = self.plan_movements(movements, mode, stamp)?;
        self.commit(&plan.entries);
        Ok(MovementReport {
            updated_stock: plan.updated_stock(),
            appended: plan.entries,
            outcomes: plan.outcomes,
        })
    }
}
