//! The `avm.*` API: marshalling over a [`JsonRpcTransport`] plus async
//! wrappers around the pure transaction builders.
//!
//! Every method that talks to the node takes a [`CancellationToken`]; a
//! fired token resolves the call to [`RpcError::Cancelled`] without
//! waiting for the transport. Cheap validation (address format, chain
//! IDs) happens before any network call.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use axia_avm::builder::{
    check_export_prefixes, check_goose_egg, BaseTxRequest, CreateAssetTxRequest,
    CreateNftAssetTxRequest, ExportTxRequest, ImportTxRequest, NftMintTxRequest,
    NftTransferTxRequest, SecpMintTxRequest, SpendOptions, TxContext,
};
use axia_avm::constants::{ADDRESS_LENGTH, MILLI_AXC};
use axia_avm::defaults::{hrp_for, network_config, ChainConfig};
use axia_avm::utxo_set::PersistedUtxos;
use axia_avm::{Address, AvmError, Id, KeyChain, MergeRule, Tx, UnsignedTx, UtxoSet};
use axia_primitives::bintools::{address_to_string, cb58_decode, parse_address, string_to_address};

use crate::cache::Memoized;
use crate::error::RpcError;
use crate::transport::JsonRpcTransport;
use crate::types::{
    AssetDescription, GetBalanceResponse, GetUtxosResponse, IssueTxResponse, TxStatusResponse,
    UtxoIndex,
};

/// A transaction to submit with [`AvmApi::issue_tx`].
#[derive(Debug, Clone)]
pub enum IssueTx {
    /// cb58 text of a signed transaction.
    Cb58(String),
    /// Raw bytes of a signed transaction.
    Bytes(Vec<u8>),
    /// A signed transaction.
    Tx(Tx),
}

/// One page of `avm.getUTXOs`.
#[derive(Debug, Clone)]
pub struct UtxoPage {
    /// Number of UTXOs the node returned.
    pub num_fetched: u64,
    /// The decoded UTXOs.
    pub utxos: UtxoSet,
    /// Cursor for the next page, when the node returned one.
    pub end_index: Option<UtxoIndex>,
}

/// Address strings for a build call. An empty `change` falls back to the
/// builder's default change owners.
#[derive(Debug, Clone, Copy, Default)]
pub struct Participants<'a> {
    /// Recipients.
    pub to: &'a [&'a str],
    /// Spenders.
    pub from: &'a [&'a str],
    /// Change owners.
    pub change: &'a [&'a str],
}

/// Client for one AVM chain.
#[derive(Debug)]
pub struct AvmApi<T> {
    transport: T,
    network_id: u32,
    hrp: String,
    blockchain_id: String,
    alias: Option<String>,
    axc_asset_id: Memoized<Id>,
    tx_fee: Memoized<u64>,
    creation_tx_fee: Memoized<u64>,
    mint_tx_fee: Memoized<u64>,
}

impl<T: JsonRpcTransport> AvmApi<T> {
    /// Create a client for the chain `blockchain_id` (cb58) on `network_id`.
    /// When the network has a built-in entry for that chain, its alias is
    /// used as the address prefix.
    pub fn new(transport: T, network_id: u32, blockchain_id: &str) -> Self {
        let alias = network_config(network_id)
            .and_then(|n| n.chain(blockchain_id).map(|c| c.alias.clone()));
        Self {
            transport,
            network_id,
            hrp: hrp_for(network_id),
            blockchain_id: blockchain_id.to_string(),
            alias,
            axc_asset_id: Memoized::new(),
            tx_fee: Memoized::new(),
            creation_tx_fee: Memoized::new(),
            mint_tx_fee: Memoized::new(),
        }
    }

    /// Create a client for the X chain of a built-in network.
    pub fn for_network(transport: T, network_id: u32) -> Result<Self, RpcError> {
        let net = network_config(network_id).ok_or_else(|| {
            AvmError::ChainId(format!("AVMAPI: no built-in configuration for network {}", network_id))
        })?;
        let x = net.x_chain().ok_or_else(|| {
            AvmError::ChainId(format!("AVMAPI: network {} has no X chain", network_id))
        })?;
        Ok(Self::new(transport, network_id, &x.blockchain_id))
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The network ID.
    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// The bech32 HRP of this network.
    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    /// The cb58 blockchain ID.
    pub fn blockchain_id(&self) -> &str {
        &self.blockchain_id
    }

    /// The chain alias, e.g. `X`, if known.
    pub fn blockchain_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Override the chain alias.
    pub fn set_blockchain_alias(&mut self, alias: &str) {
        self.alias = Some(alias.to_string());
    }

    /// An empty keychain bound to this chain.
    pub fn key_chain(&self) -> KeyChain {
        KeyChain::new(&self.hrp, self.prefix())
    }

    fn prefix(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.blockchain_id)
    }

    fn chain_config(&self) -> Option<ChainConfig> {
        network_config(self.network_id).and_then(|n| n.chain(&self.blockchain_id).cloned())
    }

    fn blockchain_id_bytes(&self) -> Result<Id, RpcError> {
        decode_chain_id(&self.blockchain_id).ok_or_else(|| {
            RpcError::Avm(AvmError::ChainId(
                "AVMAPI: blockchainID must be 32 bytes in length.".to_string(),
            ))
        })
    }

    // -- addresses --

    /// Strictly parse an address on this chain: prefix must be the alias
    /// or blockchain ID, HRP must match, 20 bytes long.
    pub fn parse_address(&self, addr: &str) -> Option<Address> {
        parse_address(
            addr,
            &self.blockchain_id,
            self.alias.as_deref(),
            ADDRESS_LENGTH,
            Some(&self.hrp),
        )
        .and_then(|b| Address::try_from(b.as_slice()).ok())
    }

    /// Render an address on this chain.
    pub fn address_from_buffer(&self, address: &Address) -> Result<String, RpcError> {
        Ok(address_to_string(&self.hrp, self.prefix(), address)?)
    }

    fn clean_addresses(&self, addrs: &[&str], caller: &str) -> Result<Vec<Address>, RpcError> {
        addrs
            .iter()
            .map(|a| {
                self.parse_address(a).ok_or_else(|| {
                    RpcError::Avm(AvmError::Address(format!(
                        "AVMAPI.{}: Invalid address format",
                        caller
                    )))
                })
            })
            .collect()
    }

    // -- fees --

    /// The network's default transaction fee.
    pub fn get_default_tx_fee(&self) -> u64 {
        self.chain_config().map_or(MILLI_AXC, |c| c.tx_fee)
    }

    /// The transaction fee used by the builders.
    pub fn get_tx_fee(&self) -> u64 {
        self.tx_fee.get_or_init(|| self.get_default_tx_fee())
    }

    /// Override the transaction fee.
    pub fn set_tx_fee(&self, fee: u64) {
        self.tx_fee.set(fee);
    }

    /// The network's default asset creation fee.
    pub fn get_default_creation_tx_fee(&self) -> u64 {
        self.chain_config().map_or(10 * MILLI_AXC, |c| c.creation_tx_fee)
    }

    /// The asset creation fee used by the builders.
    pub fn get_creation_tx_fee(&self) -> u64 {
        self.creation_tx_fee
            .get_or_init(|| self.get_default_creation_tx_fee())
    }

    /// Override the asset creation fee.
    pub fn set_creation_tx_fee(&self, fee: u64) {
        self.creation_tx_fee.set(fee);
    }

    /// The network's default mint fee.
    pub fn get_default_mint_tx_fee(&self) -> u64 {
        self.chain_config().map_or(MILLI_AXC, |c| c.mint_tx_fee)
    }

    /// The mint fee used by the builders.
    pub fn get_mint_tx_fee(&self) -> u64 {
        self.mint_tx_fee.get_or_init(|| self.get_default_mint_tx_fee())
    }

    /// Override the mint fee.
    pub fn set_mint_tx_fee(&self, fee: u64) {
        self.mint_tx_fee.set(fee);
    }

    // -- raw methods --

    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        cancel: &CancellationToken,
    ) -> Result<R, RpcError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RpcError::Cancelled),
            res = self.transport.call_method(method, params) => res?,
        };
        Ok(serde_json::from_value(result)?)
    }

    /// `avm.getUTXOs`: one page of UTXOs owned by `addresses`. With
    /// `source_chain` set, returns atomic UTXOs exported from that chain.
    /// A `limit` of zero leaves the page size to the node.
    pub async fn get_utxos(
        &self,
        addresses: &[&str],
        source_chain: Option<&str>,
        limit: u32,
        start_index: Option<&UtxoIndex>,
        cancel: &CancellationToken,
    ) -> Result<UtxoPage, RpcError> {
        let mut params = Map::new();
        params.insert("addresses".into(), json!(addresses));
        if limit > 0 {
            params.insert("limit".into(), json!(limit));
        }
        if let Some(index) = start_index {
            params.insert("startIndex".into(), serde_json::to_value(index)?);
        }
        if let Some(chain) = source_chain {
            params.insert("sourceChain".into(), json!(chain));
        }

        let resp: GetUtxosResponse = self.call("avm.getUTXOs", Value::Object(params), cancel).await?;
        let mut utxos = UtxoSet::new();
        utxos.add_string_array(&resp.utxos, false)?;
        tracing::debug!(fetched = resp.num_fetched, decoded = utxos.len(), "avm.getUTXOs");
        Ok(UtxoPage {
            num_fetched: resp.num_fetched,
            utxos,
            end_index: resp.end_index,
        })
    }

    /// Fetch UTXOs and reconcile them against a persisted cache with `rule`.
    pub async fn get_utxos_reconciled(
        &self,
        addresses: &[&str],
        cached: &PersistedUtxos,
        rule: MergeRule,
        cancel: &CancellationToken,
    ) -> Result<UtxoSet, RpcError> {
        let page = self.get_utxos(addresses, None, 0, None, cancel).await?;
        Ok(cached.reconcile(&page.utxos, rule)?)
    }

    /// `avm.getBalance`.
    pub async fn get_balance(
        &self,
        address: &str,
        asset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GetBalanceResponse, RpcError> {
        if self.parse_address(address).is_none() {
            return Err(AvmError::Address(format!(
                "AVMAPI.getBalance: Invalid address format {}",
                address
            ))
            .into());
        }
        let params = json!({ "address": address, "assetID": asset_id });
        self.call("avm.getBalance", params, cancel).await
    }

    /// `avm.getAssetDescription` for a cb58 asset ID or an alias like `AXC`.
    pub async fn get_asset_description(
        &self,
        asset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AssetDescription, RpcError> {
        self.call("avm.getAssetDescription", json!({ "assetID": asset_id }), cancel)
            .await
    }

    /// The native asset ID, fetched once and cached. `refresh` forces a
    /// new lookup.
    pub async fn get_axc_asset_id(
        &self,
        refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<Id, RpcError> {
        if refresh {
            self.axc_asset_id.invalidate();
        }
        self.axc_asset_id
            .get_or_try_init(|| async move {
                let desc = self.get_asset_description("AXC", cancel).await?;
                decode_chain_id(&desc.asset_id).ok_or_else(|| {
                    RpcError::Avm(AvmError::Serialization(format!(
                        "AVMAPI.getAXCAssetID: bad asset ID {}",
                        desc.asset_id
                    )))
                })
            })
            .await
    }

    /// Seed the native asset ID cache.
    pub fn set_axc_asset_id(&self, asset_id: Id) {
        self.axc_asset_id.set(asset_id);
    }

    /// `avm.issueTx`. Returns the transaction ID the node assigned.
    pub async fn issue_tx(&self, tx: IssueTx, cancel: &CancellationToken) -> Result<String, RpcError> {
        let encoded = match tx {
            IssueTx::Cb58(s) => {
                Tx::from_cb58(&s).map_err(|e| {
                    RpcError::Transaction(format!("AVMAPI.issueTx: provided tx is not a valid Tx: {}", e))
                })?;
                s
            }
            IssueTx::Bytes(bytes) => Tx::from_bytes(&bytes)
                .map_err(|e| {
                    RpcError::Transaction(format!("AVMAPI.issueTx: provided tx is not a valid Tx: {}", e))
                })?
                .to_cb58(),
            IssueTx::Tx(tx) => tx.to_cb58(),
        };
        let resp: IssueTxResponse = self.call("avm.issueTx", json!({ "tx": encoded }), cancel).await?;
        Ok(resp.tx_id)
    }

    /// `avm.getTxStatus`, e.g. `Processing`, `Accepted`, `Rejected`, `Unknown`.
    pub async fn get_tx_status(&self, tx_id: &str, cancel: &CancellationToken) -> Result<String, RpcError> {
        let resp: TxStatusResponse = self.call("avm.getTxStatus", json!({ "txID": tx_id }), cancel).await?;
        Ok(resp.status)
    }

    /// Run the goose egg check against the native asset.
    pub async fn check_goose_egg(
        &self,
        utx: &UnsignedTx,
        out_total: u64,
        cancel: &CancellationToken,
    ) -> Result<bool, RpcError> {
        let axc = self.get_axc_asset_id(false, cancel).await?;
        Ok(check_goose_egg(utx, &axc, out_total))
    }

    // -- builders --

    async fn context(&self, cancel: &CancellationToken) -> Result<TxContext, RpcError> {
        Ok(TxContext {
            network_id: self.network_id,
            blockchain_id: self.blockchain_id_bytes()?,
            fee_asset_id: self.get_axc_asset_id(false, cancel).await?,
        })
    }

    fn recheck(utx: UnsignedTx, ctx: &TxContext, caller: &str) -> Result<UnsignedTx, RpcError> {
        if check_goose_egg(&utx, &ctx.fee_asset_id, 0) {
            Ok(utx)
        } else {
            Err(AvmError::GooseEggCheck(format!("AVMAPI.{}: Failed Goose Egg Check", caller)).into())
        }
    }

    /// Build a transfer of `amount` of `asset_id`.
    pub async fn build_base_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        asset_id: &Id,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildBaseTx";
        let req = BaseTxRequest {
            amount,
            asset_id: *asset_id,
            to: self.clean_addresses(who.to, caller)?,
            from: self.clean_addresses(who.from, caller)?,
            change: self.clean_addresses(who.change, caller)?,
            fee: self.get_tx_fee(),
        };
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_base_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build an export of `amount` to `destination_chain` (cb58). The
    /// recipients live on the destination chain, so they are only checked
    /// for a shared prefix and a valid bech32 body. `asset_id` defaults to
    /// the native asset.
    #[allow(clippy::too_many_arguments)]
    pub async fn build_export_tx(
        &self,
        utxos: &UtxoSet,
        amount: u64,
        destination_chain: &str,
        who: &Participants<'_>,
        asset_id: Option<&Id>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildExportTx";
        check_export_prefixes(who.to)?;
        if destination_chain.is_empty() {
            return Err(AvmError::ChainId(
                "AVMAPI.buildExportTx: Destination ChainID is undefined.".to_string(),
            )
            .into());
        }
        let destination = decode_chain_id(destination_chain).ok_or_else(|| {
            RpcError::Avm(AvmError::ChainId(
                "AVMAPI.buildExportTx: Destination ChainID must be 32 bytes in length.".to_string(),
            ))
        })?;
        let to = who
            .to
            .iter()
            .map(|a| {
                string_to_address(a, Some(&self.hrp))
                    .ok()
                    .and_then(|b| Address::try_from(b.as_slice()).ok())
                    .ok_or_else(|| {
                        RpcError::Avm(AvmError::Address(format!(
                            "AVMAPI.{}: Invalid address format",
                            caller
                        )))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let from = self.clean_addresses(who.from, caller)?;
        let change = self.clean_addresses(who.change, caller)?;

        let ctx = self.context(cancel).await?;
        let req = ExportTxRequest {
            amount,
            asset_id: asset_id.copied().unwrap_or(ctx.fee_asset_id),
            destination_chain: destination,
            to,
            from,
            change,
            fee: self.get_tx_fee(),
        };
        Self::recheck(utxos.build_export_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build an import of every atomic UTXO `owners` hold on `source_chain`
    /// (cb58). The atomic UTXOs are fetched from the node; local UTXOs in
    /// `utxos` top up the fee when the imports cannot cover it.
    pub async fn build_import_tx(
        &self,
        utxos: &UtxoSet,
        owners: &[&str],
        source_chain: &str,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildImportTx";
        let source = decode_chain_id(source_chain).ok_or_else(|| {
            RpcError::Avm(AvmError::ChainId(
                "AVMAPI.buildImportTx: sourceChain is undefined or invalid sourceChain type."
                    .to_string(),
            ))
        })?;
        let to = self.clean_addresses(who.to, caller)?;
        let from = self.clean_addresses(who.from, caller)?;
        let change = self.clean_addresses(who.change, caller)?;
        self.clean_addresses(owners, caller)?;

        let page = self
            .get_utxos(owners, Some(source_chain), 0, None, cancel)
            .await?;
        if page.utxos.is_empty() {
            return Err(AvmError::NoAtomicUtxos(format!(
                "AVMAPI.buildImportTx: No atomic UTXOs to import from {} using addresses: {}",
                source_chain,
                owners.join(", ")
            ))
            .into());
        }

        let ctx = self.context(cancel).await?;
        let req = ImportTxRequest {
            atomics: page.utxos.get_all_utxos().into_iter().cloned().collect(),
            source_chain: source,
            to,
            from,
            change,
            fee: self.get_tx_fee(),
        };
        Self::recheck(utxos.build_import_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build a new asset. `from`, `change` and `fee` in `req` are replaced
    /// by `who` and the creation fee.
    pub async fn build_create_asset_tx(
        &self,
        utxos: &UtxoSet,
        mut req: CreateAssetTxRequest,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildCreateAssetTx";
        req.from = self.clean_addresses(who.from, caller)?;
        req.change = self.clean_addresses(who.change, caller)?;
        req.fee = self.get_creation_tx_fee();
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_create_asset_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build a SECP mint. `from`, `change` and `fee` in `req` are replaced
    /// by `who` and the mint fee.
    pub async fn build_secp_mint_tx(
        &self,
        utxos: &UtxoSet,
        mut req: SecpMintTxRequest,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildSECPMintTx";
        req.from = self.clean_addresses(who.from, caller)?;
        req.change = self.clean_addresses(who.change, caller)?;
        req.fee = self.get_mint_tx_fee();
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_secp_mint_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build a new NFT family. `from`, `change` and `fee` in `req` are
    /// replaced by `who` and the creation fee.
    pub async fn build_create_nft_asset_tx(
        &self,
        utxos: &UtxoSet,
        mut req: CreateNftAssetTxRequest,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildCreateNFTAssetTx";
        req.from = self.clean_addresses(who.from, caller)?;
        req.change = self.clean_addresses(who.change, caller)?;
        req.fee = self.get_creation_tx_fee();
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_create_nft_asset_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build an NFT mint. `from`, `change` and `fee` in `req` are replaced
    /// by `who` and the transaction fee.
    pub async fn build_nft_mint_tx(
        &self,
        utxos: &UtxoSet,
        mut req: NftMintTxRequest,
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildCreateNFTMintTx";
        req.from = self.clean_addresses(who.from, caller)?;
        req.change = self.clean_addresses(who.change, caller)?;
        req.fee = self.get_tx_fee();
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_nft_mint_tx(&ctx, &req, opts)?, &ctx, caller)
    }

    /// Build an NFT transfer of `utxo_ids` to `who.to`.
    pub async fn build_nft_transfer_tx(
        &self,
        utxos: &UtxoSet,
        utxo_ids: &[String],
        who: &Participants<'_>,
        opts: &SpendOptions,
        cancel: &CancellationToken,
    ) -> Result<UnsignedTx, RpcError> {
        let caller = "buildNFTTransferTx";
        let req = NftTransferTxRequest {
            to: self.clean_addresses(who.to, caller)?,
            from: self.clean_addresses(who.from, caller)?,
            change: self.clean_addresses(who.change, caller)?,
            utxo_ids: utxo_ids.to_vec(),
            fee: self.get_tx_fee(),
        };
        let ctx = self.context(cancel).await?;
        Self::recheck(utxos.build_nft_transfer_tx(&ctx, &req, opts)?, &ctx, caller)
    }
}

fn decode_chain_id(s: &str) -> Option<Id> {
    let bytes = cb58_decode(s).ok()?;
    Id::try_from(bytes.as_slice()).ok()
}
