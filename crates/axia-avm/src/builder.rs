//! Transaction builders: `UtxoSet × request → UnsignedTx`.
//!
//! Every builder follows the same steps. It validates the request, selects
//! inputs through [`UtxoSet::get_minimum_spendable`], assembles the body
//! and finally runs the goose-egg check. A transaction that fails the
//! check is discarded and never returned.
//!
//! The set is only read. Callers remove spent UTXOs themselves once the
//! transaction is accepted.

use std::time::{SystemTime, UNIX_EPOCH};

use axia_payload::Payload;

use crate::asset_amount::AssetAmountDestination;
use crate::constants::{ASSET_NAME_LEN, GOOSE_EGG_LIMIT, NFT_FX_ID, SECP_FX_ID, SYMBOL_MAX_LEN};
use crate::inputs::{SecpTransferInput, TransferableInput};
use crate::operations::{Operation, TransferableOperation};
use crate::outputs::{Output, OutputOwners, TransferableOutput};
use crate::tx::{BaseTx, CreateAssetTx, ExportTx, ImportTx, InitialStates, OperationTx, TxBody};
use crate::unsigned_tx::UnsignedTx;
use crate::utxo::Utxo;
use crate::utxo_set::UtxoSet;
use crate::{Address, AvmError, Id};

// ---------------------------------------------------------------------------
// Context and options
// ---------------------------------------------------------------------------

/// The chain a transaction is built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxContext {
    /// Network ID.
    pub network_id: u32,
    /// Chain the transaction is issued to.
    pub blockchain_id: Id,
    /// Asset fees are paid in (the native asset).
    pub fee_asset_id: Id,
}

/// Timing, ownership and memo settings shared by the builders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendOptions {
    /// Time UTXO locktimes are evaluated at, in Unix seconds.
    pub as_of: u64,
    /// Locktime of the outputs sent to the destinations.
    pub locktime: u64,
    /// Threshold of the outputs sent to the destinations.
    pub threshold: u32,
    /// Memo bytes.
    pub memo: Vec<u8>,
}

impl Default for SpendOptions {
    fn default() -> Self {
        SpendOptions {
            as_of: unix_now(),
            locktime: 0,
            threshold: 1,
            memo: Vec::new(),
        }
    }
}

impl SpendOptions {
    /// Use a typed payload (type ID and content) as the memo.
    pub fn with_payload_memo(mut self, payload: &Payload) -> Self {
        self.memo = payload.payload_bytes();
        self
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send `amount` of `asset_id` from `from` to `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseTxRequest {
    /// Amount to send.
    pub amount: u64,
    /// Asset to send.
    pub asset_id: Id,
    /// Receivers.
    pub to: Vec<Address>,
    /// Addresses whose UTXOs may be spent.
    pub from: Vec<Address>,
    /// Change receivers; `to` when empty.
    pub change: Vec<Address>,
    /// Flat fee in the fee asset.
    pub fee: u64,
}

/// Export `amount` of `asset_id` to `destination_chain`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTxRequest {
    /// Amount to export.
    pub amount: u64,
    /// Asset to export.
    pub asset_id: Id,
    /// Chain receiving the outputs.
    pub destination_chain: Id,
    /// Receivers on the destination chain.
    pub to: Vec<Address>,
    /// Addresses whose UTXOs may be spent.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// Flat fee in the fee asset.
    pub fee: u64,
}

/// Import atomic UTXOs exported from `source_chain`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportTxRequest {
    /// Atomic UTXOs to consume.
    pub atomics: Vec<Utxo>,
    /// Chain the UTXOs were exported from.
    pub source_chain: Id,
    /// Receivers of the imported value.
    pub to: Vec<Address>,
    /// Local addresses that may pay a fee the imports do not cover.
    pub from: Vec<Address>,
    /// Change receivers; `to` when empty.
    pub change: Vec<Address>,
    /// Flat fee in the fee asset.
    pub fee: u64,
}

/// Create a fungible asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateAssetTxRequest {
    /// Fee payers.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// Asset name.
    pub name: String,
    /// Asset symbol.
    pub symbol: String,
    /// Decimal places.
    pub denomination: u8,
    /// Genesis outputs.
    pub initial_states: InitialStates,
    /// Mint rights added to the genesis outputs under the SECP fx.
    pub mint_outputs: Vec<OutputOwners>,
    /// Creation fee.
    pub fee: u64,
}

/// Spend a SECP mint right to mint more of its asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpMintTxRequest {
    /// Owners of the recreated mint right.
    pub mint_owners: OutputOwners,
    /// Amount minted.
    pub transfer_amount: u64,
    /// Owners of the minted amount.
    pub transfer_owners: OutputOwners,
    /// UTXO ID of the mint right.
    pub mint_utxo_id: String,
    /// Mint right holders and fee payers.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// Mint fee.
    pub fee: u64,
}

/// A group of addresses allowed to mint one NFT group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinterSet {
    /// Signatures required.
    pub threshold: u32,
    /// Minter addresses.
    pub minters: Vec<Address>,
}

/// Create an NFT family with one group per minter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateNftAssetTxRequest {
    /// Fee payers.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// Asset name.
    pub name: String,
    /// Asset symbol.
    pub symbol: String,
    /// One NFT group per set, numbered from 0.
    pub minter_sets: Vec<MinterSet>,
    /// Creation fee.
    pub fee: u64,
}

/// Mint NFTs by spending NFT mint rights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftMintTxRequest {
    /// One owner set per NFT minted from each right.
    pub owners: Vec<OutputOwners>,
    /// UTXO IDs of the NFT mint rights.
    pub utxo_ids: Vec<String>,
    /// Group minted.
    pub group_id: u32,
    /// NFT content.
    pub payload: Vec<u8>,
    /// Mint right holders and fee payers.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// Mint fee.
    pub fee: u64,
}

/// Transfer NFTs to new owners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftTransferTxRequest {
    /// New owners.
    pub to: Vec<Address>,
    /// Current owners and fee payers.
    pub from: Vec<Address>,
    /// Change receivers; `from` when empty.
    pub change: Vec<Address>,
    /// UTXO IDs of the NFTs.
    pub utxo_ids: Vec<String>,
    /// Flat fee.
    pub fee: u64,
}

// ---------------------------------------------------------------------------
// Goose egg
// ---------------------------------------------------------------------------

/// Fee sanity check.
///
/// The burn of `native_asset` passes when it is at most
/// [`GOOSE_EGG_LIMIT`] or at most the value moved. The value moved is
/// `out_total` when positive, otherwise the transaction's own output total.
pub fn check_goose_egg(utx: &UnsignedTx, native_asset: &Id, out_total: u64) -> bool {
    let fee = utx.burn(native_asset);
    let output_total = if out_total > 0 {
        out_total
    } else {
        utx.output_total(native_asset)
    };
    fee <= GOOSE_EGG_LIMIT || fee <= output_total
}

fn guard(utx: UnsignedTx, native_asset: &Id, caller: &str) -> Result<UnsignedTx, AvmError> {
    if !check_goose_egg(&utx, native_asset, 0) {
        tracing::warn!(
            caller,
            burn = utx.burn(native_asset),
            output_total = utx.output_total(native_asset),
            "goose egg check failed"
        );
        return Err(AvmError::GooseEggCheck(format!(
            "UTXOSet.{}: Failed Goose Egg Check",
            caller
        )));
    }
    Ok(utx)
}

/// Require every export destination to carry the same chain prefix.
pub fn check_export_prefixes(to: &[&str]) -> Result<(), AvmError> {
    let mut prefixes = to.iter().map(|a| a.split('-').next().unwrap_or_default());
    if let Some(first) = prefixes.next() {
        if prefixes.any(|p| p != first) {
            return Err(AvmError::Address(
                "AVMAPI.buildExportTx: To addresses must have the same chainID prefix.".to_string(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

fn or_default(change: &[Address], fallback: &[Address]) -> Vec<Address> {
    if change.is_empty() {
        fallback.to_vec()
    } else {
        change.to_vec()
    }
}

fn check_threshold(threshold: u32, owners: usize, caller: &str) -> Result<(), AvmError> {
    if threshold as usize > owners {
        return Err(AvmError::Threshold(format!(
            "UTXOSet.{}: threshold is greater than number of addresses",
            caller
        )));
    }
    Ok(())
}

fn check_amount(amount: u64, caller: &str) -> Result<(), AvmError> {
    if amount == 0 {
        return Err(AvmError::InvalidAmount(format!(
            "UTXOSet.{}: amount must be greater than zero",
            caller
        )));
    }
    Ok(())
}

fn check_name_symbol(name: &str, symbol: &str, caller: &str) -> Result<(), AvmError> {
    if symbol.len() > SYMBOL_MAX_LEN {
        return Err(AvmError::Symbol(format!(
            "UTXOSet.{}: Symbols may not exceed length of {}",
            caller, SYMBOL_MAX_LEN
        )));
    }
    if name.len() > ASSET_NAME_LEN {
        return Err(AvmError::Name(format!(
            "UTXOSet.{}: Names may not exceed length of {}",
            caller, ASSET_NAME_LEN
        )));
    }
    Ok(())
}

/// Add a signature index for each of `from` that signs for `owners`.
fn add_spenders(
    op: &mut Operation,
    owners: &OutputOwners,
    from: &[Address],
    as_of: u64,
    caller: &str,
) -> Result<(), AvmError> {
    for spender in owners.spenders(from, as_of) {
        let Some(idx) = owners.address_idx(&spender) else {
            return Err(AvmError::AddressIndex(format!(
                "UTXOSet.{}: no such address in output: {}",
                caller,
                hex::encode(spender)
            )));
        };
        op.add_signature_idx(idx, spender);
    }
    Ok(())
}

impl UtxoSet {
    /// Gather inputs paying `fee` of the fee asset from `from`.
    fn pay_fee(
        &self,
        ctx: &TxContext,
        from: &[Address],
        change: &[Address],
        fee: u64,
        as_of: u64,
    ) -> Result<(Vec<TransferableInput>, Vec<TransferableOutput>), AvmError> {
        if fee == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        let mut aad = AssetAmountDestination::new(from.to_vec(), from.to_vec(), or_default(change, from));
        aad.add_asset_amount(ctx.fee_asset_id, 0, fee);
        self.get_minimum_spendable(&mut aad, as_of, 0, 1)?;
        Ok((aad.get_inputs().to_vec(), aad.get_all_outputs()))
    }

    fn utxo_for(&self, utxo_id: &str, caller: &str) -> Result<&Utxo, AvmError> {
        self.get_utxo(utxo_id).ok_or_else(|| {
            AvmError::Utxo(format!("UTXOSet.{}: UTXOID not found: {}", caller, utxo_id))
        })
    }

    /// A transfer of one asset, with the fee added to the native-asset leg.
    pub fn build_base_tx(
        &self,
        ctx: &TxContext,
        req: &BaseTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildBaseTx";
        check_threshold(opts.threshold, req.to.len(), CALLER)?;
        check_amount(req.amount, CALLER)?;

        let change = or_default(&req.change, &req.to);
        let mut aad = AssetAmountDestination::new(req.to.clone(), req.from.clone(), change);
        if req.asset_id == ctx.fee_asset_id {
            aad.add_asset_amount(req.asset_id, req.amount, req.fee);
        } else {
            aad.add_asset_amount(req.asset_id, req.amount, 0);
            if req.fee > 0 {
                aad.add_asset_amount(ctx.fee_asset_id, 0, req.fee);
            }
        }
        self.get_minimum_spendable(&mut aad, opts.as_of, opts.locktime, opts.threshold)?;

        let base = BaseTx::new(
            ctx.network_id,
            ctx.blockchain_id,
            aad.get_all_outputs(),
            aad.get_inputs().to_vec(),
            opts.memo.clone(),
        );
        tracing::debug!(
            ins = base.ins.len(),
            outs = base.outs.len(),
            amount = req.amount,
            fee = req.fee,
            "built base tx"
        );
        guard(UnsignedTx::new(TxBody::Base(base)), &ctx.fee_asset_id, CALLER)
    }

    /// Move `amount` into shared memory for `destination_chain`; change
    /// stays on this chain.
    pub fn build_export_tx(
        &self,
        ctx: &TxContext,
        req: &ExportTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildExportTx";
        check_threshold(opts.threshold, req.to.len(), CALLER)?;
        check_amount(req.amount, CALLER)?;

        let change = or_default(&req.change, &req.from);
        let mut aad = AssetAmountDestination::new(req.to.clone(), req.from.clone(), change);
        if req.asset_id == ctx.fee_asset_id {
            aad.add_asset_amount(req.asset_id, req.amount, req.fee);
        } else {
            aad.add_asset_amount(req.asset_id, req.amount, 0);
            if req.fee > 0 {
                aad.add_asset_amount(ctx.fee_asset_id, 0, req.fee);
            }
        }
        self.get_minimum_spendable(&mut aad, opts.as_of, opts.locktime, opts.threshold)?;

        let mut export_outs = aad.get_outputs().to_vec();
        export_outs.sort();
        let base = BaseTx::new(
            ctx.network_id,
            ctx.blockchain_id,
            aad.get_change_outputs().to_vec(),
            aad.get_inputs().to_vec(),
            opts.memo.clone(),
        );
        tracing::debug!(
            ins = base.ins.len(),
            export_outs = export_outs.len(),
            destination = %hex::encode(req.destination_chain),
            "built export tx"
        );
        let tx = ExportTx {
            base,
            destination_chain: req.destination_chain,
            export_outs,
        };
        guard(UnsignedTx::new(TxBody::Export(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Consume atomic UTXOs, paying the fee from the imported value first
    /// and from this set's UTXOs for whatever remains.
    pub fn build_import_tx(
        &self,
        ctx: &TxContext,
        req: &ImportTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildImportTx";
        check_threshold(opts.threshold, req.to.len(), CALLER)?;
        if req.atomics.is_empty() {
            return Err(AvmError::NoAtomicUtxos(format!(
                "UTXOSet.{}: no atomic UTXOs to import from {}",
                CALLER,
                hex::encode(req.source_chain)
            )));
        }

        let mut fee_paid = 0u64;
        let mut import_ins = Vec::new();
        let mut outs = Vec::new();
        for utxo in &req.atomics {
            let Output::SecpTransfer { amount, owners } = &utxo.output else {
                return Err(AvmError::Utxo(format!(
                    "UTXOSet.{}: atomic UTXO {} does not hold a transferable amount",
                    CALLER,
                    utxo.id()
                )));
            };
            let mut remaining = *amount;
            if req.fee > 0 && fee_paid < req.fee && utxo.asset_id == ctx.fee_asset_id {
                let take = remaining.min(req.fee - fee_paid);
                fee_paid += take;
                remaining -= take;
            }

            if !owners.meets_threshold(&req.from, opts.as_of) {
                return Err(AvmError::Utxo(format!(
                    "UTXOSet.{}: atomic UTXO {} is locked or not spendable by the given addresses",
                    CALLER,
                    utxo.id()
                )));
            }
            let mut input = SecpTransferInput::new(*amount);
            for spender in owners.spenders(&req.from, opts.as_of) {
                let Some(idx) = owners.address_idx(&spender) else {
                    return Err(AvmError::AddressIndex(format!(
                        "UTXOSet.{}: no such address in output: {}",
                        CALLER,
                        hex::encode(spender)
                    )));
                };
                input.add_signature_idx(idx, spender);
            }
            import_ins.push(TransferableInput {
                tx_id: utxo.tx_id,
                output_idx: utxo.output_idx,
                asset_id: utxo.asset_id,
                input,
            });

            if remaining > 0 {
                outs.push(TransferableOutput::new(
                    utxo.asset_id,
                    Output::secp_transfer(remaining, req.to.clone(), opts.locktime, opts.threshold),
                ));
            }
        }

        let mut ins = Vec::new();
        if fee_paid < req.fee {
            let change = or_default(&req.change, &req.to);
            let mut aad = AssetAmountDestination::new(req.to.clone(), req.from.clone(), change);
            aad.add_asset_amount(ctx.fee_asset_id, 0, req.fee - fee_paid);
            self.get_minimum_spendable(&mut aad, opts.as_of, opts.locktime, opts.threshold)?;
            ins = aad.get_inputs().to_vec();
            outs.extend(aad.get_all_outputs());
        }

        import_ins.sort();
        let base = BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone());
        tracing::debug!(
            import_ins = import_ins.len(),
            local_ins = base.ins.len(),
            fee_from_imports = fee_paid,
            "built import tx"
        );
        let tx = ImportTx {
            base,
            source_chain: req.source_chain,
            import_ins,
        };
        guard(UnsignedTx::new(TxBody::Import(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Create a fungible asset with the given genesis outputs.
    pub fn build_create_asset_tx(
        &self,
        ctx: &TxContext,
        req: &CreateAssetTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildCreateAssetTx";
        check_name_symbol(&req.name, &req.symbol, CALLER)?;

        let (ins, outs) = self.pay_fee(ctx, &req.from, &req.change, req.fee, opts.as_of)?;
        let mut initial_states = req.initial_states.clone();
        for owners in &req.mint_outputs {
            initial_states.add_output(SECP_FX_ID, Output::SecpMint { owners: owners.clone() });
        }

        let tx = CreateAssetTx {
            base: BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone()),
            name: req.name.clone(),
            symbol: req.symbol.clone(),
            denomination: req.denomination,
            initial_states,
        };
        guard(UnsignedTx::new(TxBody::CreateAsset(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Spend a SECP mint right: recreate it and mint `transfer_amount`.
    pub fn build_secp_mint_tx(
        &self,
        ctx: &TxContext,
        req: &SecpMintTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildSECPMintTx";
        let utxo = self.utxo_for(&req.mint_utxo_id, CALLER)?;
        let Output::SecpMint { owners } = &utxo.output else {
            return Err(AvmError::Utxo(format!(
                "UTXOSet.{}: UTXO is not a SECPMINTOUTPUTID",
                CALLER
            )));
        };

        let (ins, outs) = self.pay_fee(ctx, &req.from, &req.change, req.fee, opts.as_of)?;
        let mut op = Operation::SecpMint {
            sig_idxs: Vec::new(),
            mint_owners: req.mint_owners.clone(),
            transfer_amount: req.transfer_amount,
            transfer_owners: req.transfer_owners.clone(),
        };
        add_spenders(&mut op, owners, &req.from, opts.as_of, CALLER)?;

        let tx = OperationTx {
            base: BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone()),
            ops: vec![TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_ref()], op)],
        };
        guard(UnsignedTx::new(TxBody::Operation(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Create an NFT family; minter set `i` receives the mint right for group `i`.
    pub fn build_create_nft_asset_tx(
        &self,
        ctx: &TxContext,
        req: &CreateNftAssetTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildCreateNFTAssetTx";
        check_name_symbol(&req.name, &req.symbol, CALLER)?;
        for set in &req.minter_sets {
            check_threshold(set.threshold, set.minters.len(), CALLER)?;
        }

        let (ins, outs) = self.pay_fee(ctx, &req.from, &req.change, req.fee, opts.as_of)?;
        let mut initial_states = InitialStates::new();
        for (group_id, set) in req.minter_sets.iter().enumerate() {
            initial_states.add_output(
                NFT_FX_ID,
                Output::NftMint {
                    group_id: group_id as u32,
                    owners: OutputOwners::new(set.minters.clone(), opts.locktime, set.threshold),
                },
            );
        }

        let tx = CreateAssetTx {
            base: BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone()),
            name: req.name.clone(),
            symbol: req.symbol.clone(),
            denomination: 0,
            initial_states,
        };
        guard(UnsignedTx::new(TxBody::CreateAsset(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Mint NFTs of `group_id` from each listed NFT mint right.
    pub fn build_nft_mint_tx(
        &self,
        ctx: &TxContext,
        req: &NftMintTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildCreateNFTMintTx";
        let (ins, outs) = self.pay_fee(ctx, &req.from, &req.change, req.fee, opts.as_of)?;

        let mut ops = Vec::new();
        for utxo_id in &req.utxo_ids {
            let utxo = self.utxo_for(utxo_id, CALLER)?;
            let Output::NftMint { owners, .. } = &utxo.output else {
                return Err(AvmError::Utxo(format!(
                    "UTXOSet.{}: UTXO is not an NFTMINTOUTPUTID",
                    CALLER
                )));
            };
            let mut op = Operation::NftMint {
                sig_idxs: Vec::new(),
                group_id: req.group_id,
                payload: req.payload.clone(),
                outputs: req.owners.clone(),
            };
            add_spenders(&mut op, owners, &req.from, opts.as_of, CALLER)?;
            ops.push(TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_ref()], op));
        }
        ops.sort();

        let tx = OperationTx {
            base: BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone()),
            ops,
        };
        guard(UnsignedTx::new(TxBody::Operation(tx)), &ctx.fee_asset_id, CALLER)
    }

    /// Transfer each listed NFT to `to`, keeping its group and payload.
    pub fn build_nft_transfer_tx(
        &self,
        ctx: &TxContext,
        req: &NftTransferTxRequest,
        opts: &SpendOptions,
    ) -> Result<UnsignedTx, AvmError> {
        const CALLER: &str = "buildNFTTransferTx";
        check_threshold(opts.threshold, req.to.len(), CALLER)?;
        let (ins, outs) = self.pay_fee(ctx, &req.from, &req.change, req.fee, opts.as_of)?;

        let mut ops = Vec::new();
        for utxo_id in &req.utxo_ids {
            let utxo = self.utxo_for(utxo_id, CALLER)?;
            let Output::NftTransfer {
                group_id,
                payload,
                owners,
            } = &utxo.output
            else {
                return Err(AvmError::Utxo(format!(
                    "UTXOSet.{}: UTXO is not an NFTTRANSFEROUTPUTID",
                    CALLER
                )));
            };
            let mut op = Operation::NftTransfer {
                sig_idxs: Vec::new(),
                group_id: *group_id,
                payload: payload.clone(),
                owners: OutputOwners::new(req.to.clone(), opts.locktime, opts.threshold),
            };
            add_spenders(&mut op, owners, &req.from, opts.as_of, CALLER)?;
            ops.push(TransferableOperation::new(utxo.asset_id, vec![utxo.utxo_ref()], op));
        }
        ops.sort();

        let tx = OperationTx {
            base: BaseTx::new(ctx.network_id, ctx.blockchain_id, outs, ins, opts.memo.clone()),
            ops,
        };
        guard(UnsignedTx::new(TxBody::Operation(tx)), &ctx.fee_asset_id, CALLER)
    }
}
