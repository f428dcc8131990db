//! Ledger replay and chain verification
//!
//! Stock is derivable from the ledger alone. `verify_chain` walks every SKU's
//! entries and reports each snapshot that does not follow from the previous
//! one, plus every item whose stock disagrees with the sum of its deltas.
//! A single corrupted snapshot is reported once, whether later entries were
//! built on the corrupted value or on the correct one.

use super::book::StockBook;
use serde::Serialize;
use shared::inventory::LedgerEntry;
use std::collections::BTreeMap;

/// One broken link in a SKU's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainBreak {
    pub sku: String,
    pub entry_id: String,
    /// previous stock_after + delta
    pub expected: i64,
    /// recorded stock_after
    pub actual: i64,
}

/// Item whose stock field disagrees with its ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMismatch {
    pub sku: String,
    pub ledger_stock: i64,
    pub item_stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub entries_checked: usize,
    pub breaks: Vec<ChainBreak>,
    pub mismatches: Vec<StockMismatch>,
}

impl ChainVerification {
    pub fn is_intact(&self) -> bool {
        self.breaks.is_empty() && self.mismatches.is_empty()
    }
}

/// Final stock per SKU by summing deltas in append order
///
/// Sums saturate; a ledger built through `StockBook` never gets near the
/// bounds.
pub fn rebuild_stock<'a>(
    entries: impl IntoIterator<Item = &'a LedgerEntry>,
) -> BTreeMap<String, i64> {
    let mut stock: BTreeMap<String, i64> = BTreeMap::new();
    for entry in entries {
        let sum = stock.entry(entry.sku.clone()).or_insert(0);
        *sum = sum.saturating_add(entry.delta);
    }
    stock
}

/// Where a SKU's chain stands after the last checked entry
#[derive(Clone, Copy, Default)]
struct Link {
    recorded: i64,
    /// What the previous entry should have recorded, if it was broken
    repaired: Option<i64>,
}

pub fn verify_chain(book: &StockBook) -> ChainVerification {
    let mut links: BTreeMap<&str, Link> = BTreeMap::new();
    let mut report = ChainVerification::default();

    for entry in book.ledger() {
        let link = links.get(entry.sku.as_str()).copied().unwrap_or_default();
        let expected = link.recorded.checked_add(entry.delta);
        let repaired = link.repaired.and_then(|r| r.checked_add(entry.delta));

        // After a break the next entry may build on either value
        let broken = expected != Some(entry.stock_after) && repaired != Some(entry.stock_after);
        if broken {
            report.breaks.push(ChainBreak {
                sku: entry.sku.clone(),
                entry_id: entry.id.clone(),
                expected: link.recorded.saturating_add(entry.delta),
                actual: entry.stock_after,
            });
        }
        links.insert(
            entry.sku.as_str(),
            Link {
                recorded: entry.stock_after,
                repaired: if broken { expected } else { None },
            },
        );
        report.entries_checked += 1;
    }

    let ledger_stock = rebuild_stock(book.ledger());
    for item in book.items() {
        let ledger_stock = ledger_stock.get(&item.sku).copied().unwrap_or(0);
        if ledger_stock != item.stock {
            report.mismatches.push(StockMismatch {
                sku: item.sku.clone(),
                ledger_stock,
                item_stock: item.stock,
            });
        }
    }

    report
}
