use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::XvgError;
use crate::types::{Utxo, UtxoRef};

/// Result of UTXO selection: the chosen UTXOs and their aggregate value.
#[derive(Debug, Clone)]
pub struct UtxoSelection {
    pub selected: Vec<Utxo>,
    pub total: Decimal,
    /// `total - target`, returned to the sender.
    pub change: Decimal,
}

impl UtxoSelection {
    pub fn references(&self) -> Vec<UtxoRef> {
        self.selected.iter().map(Utxo::reference).collect()
    }
}

/// Fetched UTXO references minus the ones already spent, fetch order kept.
pub fn remaining_refs(utxos: &[Utxo], spent: &[UtxoRef]) -> Vec<UtxoRef> {
    let spent: HashSet<&UtxoRef> = spent.iter().collect();
    utxos
        .iter()
        .map(Utxo::reference)
        .filter(|r| !spent.contains(r))
        .collect()
}

/// Select UTXOs covering `target` (outputs plus fee).
///
/// Largest-first over the UTXOs not listed in `exclude`; ties keep fetch
/// order. Stops as soon as the running total reaches `target`.
pub fn select_largest_first(
    utxos: &[Utxo],
    exclude: &[UtxoRef],
    target: Decimal,
) -> Result<UtxoSelection, XvgError> {
    let excluded: HashSet<&UtxoRef> = exclude.iter().collect();
    let mut candidates: Vec<&Utxo> = utxos
        .iter()
        .filter(|u| !excluded.contains(&u.reference()))
        .collect();

    if candidates.is_empty() {
        return Err(XvgError::InsufficientFunds {
            needed: target,
            available: Decimal::ZERO,
        });
    }

    // Stable sort: equal values stay in fetch order.
    candidates.sort_by(|a, b| b.value.cmp(&a.value));

    let mut selected = Vec::new();
    let mut total = Decimal::ZERO;
    for utxo in candidates {
        selected.push(utxo.clone());
        total = total
            .checked_add(utxo.value)
            .ok_or_else(|| XvgError::InvalidParams("amount overflow".into()))?;
        if total >= target {
            return Ok(UtxoSelection {
                selected,
                total,
                change: total - target,
            });
        }
    }

    Err(XvgError::InsufficientFunds {
        needed: target,
        available: total,
    })
}
