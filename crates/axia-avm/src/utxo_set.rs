//! A set of UTXOs keyed by UTXO ID, with an owner index, set algebra,
//! balance queries and input selection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::asset_amount::AssetAmountDestination;
use crate::inputs::{SecpTransferInput, TransferableInput};
use crate::outputs::{Output, TransferableOutput};
use crate::utxo::Utxo;
use crate::{Address, AvmError, Id};

// ---------------------------------------------------------------------------
// MergeRule
// ---------------------------------------------------------------------------

/// How `merge_by_rule` combines the current set (A) with a newer one (B).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeRule {
    /// A ∪ B.
    Union,
    /// A ∩ B.
    Intersection,
    /// A \ B (`differenceSelf`).
    Complement,
    /// B \ A (`differenceNew`).
    Difference,
    /// (A \ B) ∪ (B \ A).
    SymDifference,
    /// The union with B's members taken out, i.e. A \ B.
    UnionMinusNew,
    /// The union with A's members taken out, i.e. B \ A.
    UnionMinusSelf,
}

impl MergeRule {
    /// The canonical rule name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeRule::Union => "union",
            MergeRule::Intersection => "intersection",
            MergeRule::Complement => "differenceSelf",
            MergeRule::Difference => "differenceNew",
            MergeRule::SymDifference => "symDifference",
            MergeRule::UnionMinusNew => "unionMinusNew",
            MergeRule::UnionMinusSelf => "unionMinusSelf",
        }
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeRule {
    type Err = AvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(MergeRule::Union),
            "intersection" => Ok(MergeRule::Intersection),
            "complement" | "differenceSelf" => Ok(MergeRule::Complement),
            "diff" | "difference" | "differenceNew" => Ok(MergeRule::Difference),
            "symDiff" | "symDifference" => Ok(MergeRule::SymDifference),
            "unionMinusNew" => Ok(MergeRule::UnionMinusNew),
            "unionMinusSelf" => Ok(MergeRule::UnionMinusSelf),
            _ => Err(AvmError::MergeRule(
                "UTXOSet.mergeByRule: bad MergeRule".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// UtxoSet
// ---------------------------------------------------------------------------

/// UTXOs keyed by UTXO ID, indexed by owner address.
///
/// Iteration is in UTXO ID order. Builders only read a set; they return
/// new transactions and never remove what they spend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoSet {
    utxos: BTreeMap<String, Utxo>,
    address_utxos: BTreeMap<Address, BTreeSet<String>>,
}

impl UtxoSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of UTXOs.
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// True if the set holds no UTXOs.
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Add a UTXO. An existing entry with the same ID is replaced only when
    /// `overwrite` is set; returns the UTXO if it was stored.
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> Option<&Utxo> {
        let id = utxo.id();
        if self.utxos.contains_key(&id) {
            if !overwrite {
                return None;
            }
            self.remove(&id);
        }
        for addr in utxo.output.owners().addresses() {
            self.address_utxos.entry(*addr).or_default().insert(id.clone());
        }
        self.utxos.insert(id.clone(), utxo);
        self.utxos.get(&id)
    }

    /// Parse a cb58 UTXO string and add it.
    pub fn add_string(&mut self, s: &str, overwrite: bool) -> Result<Option<&Utxo>, AvmError> {
        let utxo: Utxo = s.parse()?;
        Ok(self.add(utxo, overwrite))
    }

    /// Add several UTXOs; returns how many were stored.
    pub fn add_array<I>(&mut self, utxos: I, overwrite: bool) -> usize
    where
        I: IntoIterator<Item = Utxo>,
    {
        utxos
            .into_iter()
            .filter(|u| self.add(u.clone(), overwrite).is_some())
            .count()
    }

    /// Parse and add several cb58 UTXO strings; returns how many were stored.
    pub fn add_string_array<S: AsRef<str>>(&mut self, strings: &[S], overwrite: bool) -> Result<usize, AvmError> {
        let utxos = strings
            .iter()
            .map(|s| s.as_ref().parse::<Utxo>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.add_array(utxos, overwrite))
    }

    /// Remove a UTXO by ID.
    pub fn remove(&mut self, utxo_id: &str) -> Option<Utxo> {
        let utxo = self.utxos.remove(utxo_id)?;
        for addr in utxo.output.owners().addresses() {
            if let Some(ids) = self.address_utxos.get_mut(addr) {
                ids.remove(utxo_id);
                if ids.is_empty() {
                    self.address_utxos.remove(addr);
                }
            }
        }
        Some(utxo)
    }

    /// Remove several UTXOs by ID, returning those that were present.
    pub fn remove_array<S: AsRef<str>>(&mut self, utxo_ids: &[S]) -> Vec<Utxo> {
        utxo_ids.iter().filter_map(|id| self.remove(id.as_ref())).collect()
    }

    /// True if a UTXO with this ID is held.
    pub fn includes(&self, utxo_id: &str) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    /// The UTXO with this ID.
    pub fn get_utxo(&self, utxo_id: &str) -> Option<&Utxo> {
        self.utxos.get(utxo_id)
    }

    /// All UTXOs, in ID order.
    pub fn get_all_utxos(&self) -> Vec<&Utxo> {
        self.utxos.values().collect()
    }

    /// All UTXOs as cb58 strings, in ID order.
    pub fn get_all_utxo_strings(&self) -> Vec<String> {
        self.utxos.values().map(Utxo::to_string).collect()
    }

    /// IDs of the UTXOs owned by any of `addresses`, or of all UTXOs when
    /// `addresses` is empty. With `spendable_as_of`, UTXOs still locked at
    /// that time are left out.
    pub fn get_utxo_ids(&self, addresses: &[Address], spendable_as_of: Option<u64>) -> Vec<String> {
        let ids: BTreeSet<&String> = if addresses.is_empty() {
            self.utxos.keys().collect()
        } else {
            addresses
                .iter()
                .filter_map(|a| self.address_utxos.get(a))
                .flatten()
                .collect()
        };
        ids.into_iter()
            .filter(|id| match (spendable_as_of, self.utxos.get(*id)) {
                (Some(as_of), Some(u)) => u.output.owners().locktime() <= as_of,
                (None, Some(_)) => true,
                _ => false,
            })
            .cloned()
            .collect()
    }

    /// Every address that owns at least one UTXO.
    pub fn get_addresses(&self) -> Vec<Address> {
        self.address_utxos.keys().copied().collect()
    }

    /// Total of `asset_id` in SECP transfer outputs that `addresses` can
    /// spend at `as_of`.
    pub fn get_balance(&self, addresses: &[Address], asset_id: &Id, as_of: u64) -> u64 {
        self.get_utxo_ids(addresses, Some(as_of))
            .iter()
            .filter_map(|id| self.utxos.get(id))
            .filter(|u| &u.asset_id == asset_id)
            .filter_map(|u| match &u.output {
                Output::SecpTransfer { amount, owners } if owners.meets_threshold(addresses, as_of) => {
                    Some(*amount)
                }
                _ => None,
            })
            .fold(0u64, u64::saturating_add)
    }

    /// Distinct asset IDs held, optionally only by `addresses`.
    pub fn get_asset_ids(&self, addresses: Option<&[Address]>) -> Vec<Id> {
        let ids = match addresses {
            Some(a) => self.get_utxo_ids(a, None),
            None => self.utxos.keys().cloned().collect(),
        };
        let assets: BTreeSet<Id> = ids
            .iter()
            .filter_map(|id| self.utxos.get(id))
            .map(|u| u.asset_id)
            .collect();
        assets.into_iter().collect()
    }

    /// A new set holding the UTXOs that satisfy `pred`.
    pub fn filter<F>(&self, pred: F) -> UtxoSet
    where
        F: Fn(&Utxo) -> bool,
    {
        let mut out = UtxoSet::new();
        out.add_array(self.utxos.values().filter(|u| pred(*u)).cloned(), false);
        out
    }

    // -----------------------------------------------------------------
    // Set algebra
    // -----------------------------------------------------------------

    fn id_set(&self) -> BTreeSet<&String> {
        self.utxos.keys().collect()
    }

    /// Build a set from `ids`, taking `newer`'s copy where both hold one.
    fn from_ids<'a, I>(ids: I, older: &UtxoSet, newer: &UtxoSet) -> UtxoSet
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out = UtxoSet::new();
        for id in ids {
            if let Some(u) = newer.utxos.get(id).or_else(|| older.utxos.get(id)) {
                out.add(u.clone(), false);
            }
        }
        out
    }

    /// Every UTXO of either set; `other`'s copy wins on conflict.
    pub fn union(&self, other: &UtxoSet) -> UtxoSet {
        Self::from_ids(self.id_set().union(&other.id_set()).copied(), self, other)
    }

    /// UTXOs held by both sets.
    pub fn intersection(&self, other: &UtxoSet) -> UtxoSet {
        Self::from_ids(self.id_set().intersection(&other.id_set()).copied(), self, other)
    }

    /// UTXOs of this set that `other` lacks.
    pub fn difference(&self, other: &UtxoSet) -> UtxoSet {
        Self::from_ids(self.id_set().difference(&other.id_set()).copied(), self, other)
    }

    /// UTXOs held by exactly one of the sets.
    pub fn sym_difference(&self, other: &UtxoSet) -> UtxoSet {
        Self::from_ids(
            self.id_set().symmetric_difference(&other.id_set()).copied(),
            self,
            other,
        )
    }

    /// This set plus `other`'s UTXOs (only those in `utxo_ids`, when given).
    /// `other`'s copy wins on conflict.
    pub fn merge(&self, other: &UtxoSet, utxo_ids: Option<&[String]>) -> UtxoSet {
        let mut out = self.clone();
        let incoming = other
            .utxos
            .iter()
            .filter(|(id, _)| utxo_ids.map_or(true, |ids| ids.contains(*id)))
            .map(|(_, u)| u.clone());
        out.add_array(incoming, true);
        out
    }

    /// Combine with a newer set according to `rule`.
    pub fn merge_by_rule(&self, other: &UtxoSet, rule: MergeRule) -> UtxoSet {
        let out = match rule {
            MergeRule::Union => self.union(other),
            MergeRule::Intersection => self.intersection(other),
            MergeRule::Complement | MergeRule::UnionMinusNew => self.difference(other),
            MergeRule::Difference | MergeRule::UnionMinusSelf => other.difference(self),
            MergeRule::SymDifference => self.sym_difference(other),
        };
        tracing::debug!(rule = %rule, before = self.len(), incoming = other.len(), after = out.len(), "merged utxo sets");
        out
    }

    // -----------------------------------------------------------------
    // Input selection
    // -----------------------------------------------------------------

    /// Select SECP transfer UTXOs covering every amount in `aad`, then
    /// record destination outputs (with `locktime`/`threshold`) and change.
    ///
    /// Candidates are taken largest amount first, ties by UTXO ID. A UTXO
    /// is only used if the senders meet its threshold at `as_of`.
    pub fn get_minimum_spendable(
        &self,
        aad: &mut AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        threshold: u32,
    ) -> Result<(), AvmError> {
        let mut candidates: Vec<(&String, &Utxo, u64)> = self
            .utxos
            .iter()
            .filter_map(|(id, u)| u.output.amount().map(|amt| (id, u, amt)))
            .collect();
        candidates.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));

        let senders = aad.get_senders().to_vec();
        for (id, utxo, amount) in candidates {
            let Some(asset_amount) = aad.get_asset_amount(&utxo.asset_id) else {
                continue;
            };
            if asset_amount.is_finished() {
                continue;
            }
            let owners = utxo.output.owners();
            if !owners.meets_threshold(&senders, as_of) {
                continue;
            }

            let mut input = SecpTransferInput::new(amount);
            for spender in owners.spenders(&senders, as_of) {
                let Some(idx) = owners.address_idx(&spender) else {
                    return Err(AvmError::AddressIndex(format!(
                        "UTXOSet.getMinimumSpendable: no such address in output: {}",
                        hex::encode(spender)
                    )));
                };
                input.add_signature_idx(idx, spender);
            }
            if let Some(a) = aad.get_asset_amount_mut(&utxo.asset_id) {
                a.spend_amount(amount);
            }
            tracing::debug!(utxo_id = %id, amount, "selected utxo");
            aad.add_input(TransferableInput {
                tx_id: utxo.tx_id,
                output_idx: utxo.output_idx,
                asset_id: utxo.asset_id,
                input,
            });
        }

        if !aad.can_complete() {
            let (needed, available) = aad
                .get_amounts()
                .iter()
                .find(|a| !a.is_finished())
                .map(|a| (a.amount().saturating_add(a.burn()), a.spent()))
                .unwrap_or_default();
            return Err(AvmError::InsufficientFunds { needed, available });
        }

        let amounts = aad.get_amounts().to_vec();
        for a in amounts {
            if a.amount() > 0 {
                let out = Output::secp_transfer(
                    a.amount(),
                    aad.get_destinations().to_vec(),
                    locktime,
                    threshold,
                );
                aad.add_output(TransferableOutput::new(*a.asset_id(), out));
            }
            if a.change() > 0 {
                let out = Output::secp_transfer(a.change(), aad.get_change_addresses().to_vec(), 0, 1);
                aad.add_change(TransferableOutput::new(*a.asset_id(), out));
            }
            tracing::debug!(
                asset_id = %hex::encode(a.asset_id()),
                amount = a.amount(),
                burn = a.burn(),
                change = a.change(),
                "asset amount settled"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// A named, versioned snapshot of UTXO strings, stored as JSON by the
/// application and reconciled against fresh node data on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedUtxos {
    /// Storage key.
    pub name: String,
    /// Format version chosen by the application.
    pub version: u32,
    /// cb58 UTXO strings.
    pub utxos: Vec<String>,
}

impl PersistedUtxos {
    /// Snapshot `set` under `name` and `version`.
    pub fn from_set(name: &str, version: u32, set: &UtxoSet) -> Self {
        PersistedUtxos {
            name: name.to_string(),
            version,
            utxos: set.get_all_utxo_strings(),
        }
    }

    /// Parse the cached strings into a set.
    pub fn to_set(&self) -> Result<UtxoSet, AvmError> {
        let mut set = UtxoSet::new();
        set.add_string_array(&self.utxos, false)?;
        Ok(set)
    }

    /// Merge the cached set (A) with `fresh` node data (B) under `rule`.
    pub fn reconcile(&self, fresh: &UtxoSet, rule: MergeRule) -> Result<UtxoSet, AvmError> {
        Ok(self.to_set()?.merge_by_rule(fresh, rule))
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, AvmError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(s: &str) -> Result<Self, AvmError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(tx: u8, amount: u64, owner: u8) -> Utxo {
        Utxo::new([tx; 32], 0, [0xaa; 32], Output::secp_transfer(amount, vec![[owner; 20]], 0, 1))
    }

    #[test]
    fn test_add_respects_overwrite() {
        let mut set = UtxoSet::new();
        assert!(set.add(utxo(1, 10, 1), false).is_some());
        assert!(set.add(utxo(1, 10, 1), false).is_none());
        assert!(set.add(utxo(1, 10, 1), true).is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_updates_owner_index() {
        let mut set = UtxoSet::new();
        let u = utxo(1, 10, 1);
        let id = u.id();
        set.add(u, false);
        assert_eq!(set.get_addresses(), vec![[1u8; 20]]);
        assert!(set.remove(&id).is_some());
        assert!(set.get_addresses().is_empty());
        assert!(!set.includes(&id));
    }

    #[test]
    fn test_get_utxo_ids_by_address_and_locktime() {
        let mut set = UtxoSet::new();
        set.add(utxo(1, 10, 1), false);
        set.add(utxo(2, 10, 2), false);
        set.add(
            Utxo::new([3u8; 32], 0, [0xaa; 32], Output::secp_transfer(5, vec![[1u8; 20]], 1000, 1)),
            false,
        );
        assert_eq!(set.get_utxo_ids(&[[1u8; 20]], None).len(), 2);
        assert_eq!(set.get_utxo_ids(&[[1u8; 20]], Some(999)).len(), 1);
        assert_eq!(set.get_utxo_ids(&[], None).len(), 3);
        assert_eq!(set.get_balance(&[[1u8; 20]], &[0xaa; 32], 999), 10);
        assert_eq!(set.get_balance(&[[1u8; 20]], &[0xaa; 32], 1000), 15);
    }

    #[test]
    fn test_merge_rule_parsing() {
        assert_eq!("complement".parse::<MergeRule>().unwrap(), MergeRule::Complement);
        assert_eq!("differenceSelf".parse::<MergeRule>().unwrap(), MergeRule::Complement);
        assert_eq!("symDiff".parse::<MergeRule>().unwrap(), MergeRule::SymDifference);
        let err = "bogus".parse::<MergeRule>().unwrap_err();
        assert_eq!(err.to_string(), "UTXOSet.mergeByRule: bad MergeRule");
    }

    #[test]
    fn test_union_prefers_newer_copy() {
        let mut old = UtxoSet::new();
        let mut newer = UtxoSet::new();
        old.add(utxo(1, 10, 1), false);
        old.add(utxo(2, 20, 1), false);
        let fresh = utxo(1, 99, 1);
        newer.add(fresh.clone(), false);
        let merged = old.merge_by_rule(&newer, MergeRule::Union);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get_utxo(&fresh.id()), Some(&fresh));
        let both = old.merge_by_rule(&newer, MergeRule::Intersection);
        assert_eq!(both.get_all_utxos(), vec![&fresh]);
    }
}
