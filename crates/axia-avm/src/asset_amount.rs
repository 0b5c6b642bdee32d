//! Per-asset spend accounting used while selecting UTXOs.

use crate::inputs::TransferableInput;
use crate::outputs::TransferableOutput;
use crate::{Address, Id};

/// How much of one asset a transaction must gather, and how much it has.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetAmount {
    asset_id: Id,
    amount: u64,
    burn: u64,
    spent: u64,
    change: u64,
    finished: bool,
}

impl AssetAmount {
    /// Require `amount` to be sent and `burn` to be paid as fee.
    pub fn new(asset_id: Id, amount: u64, burn: u64) -> Self {
        AssetAmount {
            asset_id,
            amount,
            burn,
            spent: 0,
            change: 0,
            finished: amount.saturating_add(burn) == 0,
        }
    }

    /// The asset.
    pub fn asset_id(&self) -> &Id {
        &self.asset_id
    }

    /// Amount to send.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Amount to burn.
    pub fn burn(&self) -> u64 {
        self.burn
    }

    /// Amount gathered so far.
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Excess over `amount + burn`, valid once finished.
    pub fn change(&self) -> u64 {
        self.change
    }

    /// True once `spent >= amount + burn`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record `amt` gathered; returns whether the requirement is now met.
    pub fn spend_amount(&mut self, amt: u64) -> bool {
        if !self.finished {
            self.spent = self.spent.saturating_add(amt);
            let total = self.amount.saturating_add(self.burn);
            if self.spent >= total {
                self.change = self.spent - total;
                self.finished = true;
            }
        }
        self.finished
    }
}

/// The accumulating state of one spend: who pays, who receives, the
/// per-asset requirements, and the inputs and outputs chosen so far.
#[derive(Clone, Debug, Default)]
pub struct AssetAmountDestination {
    destinations: Vec<Address>,
    senders: Vec<Address>,
    change_addresses: Vec<Address>,
    amounts: Vec<AssetAmount>,
    inputs: Vec<TransferableInput>,
    outputs: Vec<TransferableOutput>,
    change: Vec<TransferableOutput>,
}

impl AssetAmountDestination {
    /// A spend from `senders` to `destinations`, change to `change_addresses`.
    pub fn new(destinations: Vec<Address>, senders: Vec<Address>, change_addresses: Vec<Address>) -> Self {
        AssetAmountDestination {
            destinations,
            senders,
            change_addresses,
            ..Default::default()
        }
    }

    /// Require `amount` plus `burn` of `asset_id`.
    pub fn add_asset_amount(&mut self, asset_id: Id, amount: u64, burn: u64) {
        self.amounts.push(AssetAmount::new(asset_id, amount, burn));
    }

    /// True if a requirement for `asset_id` was added.
    pub fn asset_exists(&self, asset_id: &Id) -> bool {
        self.amounts.iter().any(|a| &a.asset_id == asset_id)
    }

    /// The requirement for `asset_id`.
    pub fn get_asset_amount(&self, asset_id: &Id) -> Option<&AssetAmount> {
        self.amounts.iter().find(|a| &a.asset_id == asset_id)
    }

    /// Mutable requirement for `asset_id`.
    pub fn get_asset_amount_mut(&mut self, asset_id: &Id) -> Option<&mut AssetAmount> {
        self.amounts.iter_mut().find(|a| &a.asset_id == asset_id)
    }

    /// All requirements, in the order they were added.
    pub fn get_amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    /// True once every requirement is met.
    pub fn can_complete(&self) -> bool {
        self.amounts.iter().all(AssetAmount::is_finished)
    }

    /// Receivers of the requested amounts.
    pub fn get_destinations(&self) -> &[Address] {
        &self.destinations
    }

    /// Addresses whose UTXOs may be spent.
    pub fn get_senders(&self) -> &[Address] {
        &self.senders
    }

    /// Receivers of change.
    pub fn get_change_addresses(&self) -> &[Address] {
        &self.change_addresses
    }

    /// Record a chosen input.
    pub fn add_input(&mut self, input: TransferableInput) {
        self.inputs.push(input);
    }

    /// Record an output to the destinations.
    pub fn add_output(&mut self, output: TransferableOutput) {
        self.outputs.push(output);
    }

    /// Record a change output.
    pub fn add_change(&mut self, output: TransferableOutput) {
        self.change.push(output);
    }

    /// Chosen inputs.
    pub fn get_inputs(&self) -> &[TransferableInput] {
        &self.inputs
    }

    /// Outputs to the destinations.
    pub fn get_outputs(&self) -> &[TransferableOutput] {
        &self.outputs
    }

    /// Change outputs.
    pub fn get_change_outputs(&self) -> &[TransferableOutput] {
        &self.change
    }

    /// Destination outputs followed by change outputs.
    pub fn get_all_outputs(&self) -> Vec<TransferableOutput> {
        self.outputs.iter().chain(self.change.iter()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_amount_computes_change() {
        let mut a = AssetAmount::new([1u8; 32], 400, 10);
        assert!(!a.spend_amount(300));
        assert!(a.spend_amount(700));
        assert_eq!(a.spent(), 1000);
        assert_eq!(a.change(), 590);
        // Further spends are ignored once finished.
        assert!(a.spend_amount(5));
        assert_eq!(a.spent(), 1000);
    }

    #[test]
    fn test_zero_requirement_is_finished() {
        assert!(AssetAmount::new([0u8; 32], 0, 0).is_finished());
        let mut aad = AssetAmountDestination::new(vec![], vec![], vec![]);
        assert!(aad.can_complete());
        aad.add_asset_amount([1u8; 32], 5, 0);
        assert!(aad.asset_exists(&[1u8; 32]));
        assert!(!aad.can_complete());
    }
}
