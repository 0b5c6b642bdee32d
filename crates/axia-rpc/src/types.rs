//! Configuration and JSON shapes for the `avm.*` RPC methods.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Configuration for [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Node base URL, e.g. `http://localhost:9650`.
    pub base_url: String,
    /// Chain endpoint path appended to the base URL.
    pub endpoint: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9650".to_string(),
            endpoint: "/ext/bc/X".to_string(),
            api_key: None,
        }
    }
}

impl RpcConfig {
    /// Full request URL.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint)
    }
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request ID.
    pub id: u64,
    /// Method name, e.g. `avm.getUTXOs`.
    pub method: &'a str,
    /// Method parameters.
    pub params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorBody {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// Result on success.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error on failure.
    #[serde(default)]
    pub error: Option<JsonRpcErrorBody>,
}

/// Nodes render integers either as JSON numbers or decimal strings.
fn u64_from_str_or_num<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Num {
        Str(String),
        Int(u64),
    }
    match Num::deserialize(d)? {
        Num::Int(n) => Ok(n),
        Num::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Pagination cursor for `avm.getUTXOs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoIndex {
    /// Last address visited.
    pub address: String,
    /// Last UTXO ID visited.
    pub utxo: String,
}

/// Raw `avm.getUTXOs` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosResponse {
    /// Number of UTXOs in this page.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub num_fetched: u64,
    /// cb58 UTXO strings.
    pub utxos: Vec<String>,
    /// Cursor for the next page.
    #[serde(default)]
    pub end_index: Option<UtxoIndex>,
}

/// A UTXO reference as returned by `avm.getBalance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoIdRef {
    /// cb58 transaction ID.
    #[serde(rename = "txID")]
    pub tx_id: String,
    /// Output index.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub output_index: u64,
}

/// `avm.getBalance` result.
#[derive(Debug, Clone, Deserialize)]
pub struct GetBalanceResponse {
    /// Balance in the asset's smallest unit.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
    /// UTXOs contributing to the balance.
    #[serde(rename = "utxoIDs", default)]
    pub utxo_ids: Vec<UtxoIdRef>,
}

/// `avm.getAssetDescription` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetDescription {
    /// cb58 asset ID.
    #[serde(rename = "assetID")]
    pub asset_id: String,
    /// Asset name.
    pub name: String,
    /// Asset symbol.
    pub symbol: String,
    /// Decimal places.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub denomination: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueTxResponse {
    #[serde(rename = "txID")]
    pub tx_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TxStatusResponse {
    pub status: String,
}
