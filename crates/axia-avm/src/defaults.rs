//! Per-network configuration: HRP, chain IDs, aliases, native asset and
//! fee schedule.
//!
//! The built-in table covers the main network (1), the Fuji test network
//! (5) and a local network (12345). Any other network ID renders addresses
//! with the `custom` HRP. Applications that run their own networks can
//! deserialize a [`NetworkConfig`] from JSON instead.

use serde::{Deserialize, Serialize};

use axia_primitives::bintools::cb58_decode;

use crate::constants::MILLI_AXC;
use crate::{AvmError, Id};

/// HRP used for network IDs without a built-in entry.
pub const FALLBACK_HRP: &str = "custom";

/// Configuration of one chain on a network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// cb58 blockchain ID.
    pub blockchain_id: String,
    /// Short alias used as the address prefix, e.g. `X`.
    pub alias: String,
    /// VM name, e.g. `avm`.
    pub vm: String,
    /// Flat fee for ordinary transactions, in nAXC.
    pub tx_fee: u64,
    /// Fee for creating an asset, in nAXC.
    pub creation_tx_fee: u64,
    /// Fee for minting, in nAXC.
    pub mint_tx_fee: u64,
    /// cb58 ID of the native asset, when the chain holds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axc_asset_id: Option<String>,
}

impl ChainConfig {
    /// The decoded 32-byte blockchain ID.
    pub fn blockchain_id_bytes(&self) -> Result<Id, AvmError> {
        decode_id(&self.blockchain_id, "blockchainID")
    }

    /// The decoded native asset ID.
    pub fn axc_asset_id_bytes(&self) -> Result<Option<Id>, AvmError> {
        self.axc_asset_id
            .as_deref()
            .map(|s| decode_id(s, "AXCAssetID"))
            .transpose()
    }
}

/// Configuration of one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Numeric network ID.
    pub network_id: u32,
    /// Bech32 human-readable part.
    pub hrp: String,
    /// Chains on the network.
    pub chains: Vec<ChainConfig>,
}

impl NetworkConfig {
    /// Look a chain up by alias or blockchain ID.
    pub fn chain(&self, alias_or_id: &str) -> Option<&ChainConfig> {
        self.chains
            .iter()
            .find(|c| c.alias == alias_or_id || c.blockchain_id == alias_or_id)
    }

    /// The exchange (X) chain.
    pub fn x_chain(&self) -> Option<&ChainConfig> {
        self.chain("X")
    }

    /// Load from JSON.
    pub fn from_json(s: &str) -> Result<Self, AvmError> {
        Ok(serde_json::from_str(s)?)
    }
}

fn decode_id(s: &str, field: &str) -> Result<Id, AvmError> {
    let bytes = cb58_decode(s)?;
    <Id>::try_from(bytes.as_slice()).map_err(|_| {
        AvmError::ChainId(format!(
            "Defaults: {} must be 32 bytes in length, got {}",
            field,
            bytes.len()
        ))
    })
}

const PLATFORM_CHAIN_ID: &str = "11111111111111111111111111111111LpoYY";

fn chain(blockchain_id: &str, alias: &str, vm: &str, axc_asset_id: Option<&str>) -> ChainConfig {
    ChainConfig {
        blockchain_id: blockchain_id.to_string(),
        alias: alias.to_string(),
        vm: vm.to_string(),
        tx_fee: MILLI_AXC,
        creation_tx_fee: 10 * MILLI_AXC,
        mint_tx_fee: MILLI_AXC,
        axc_asset_id: axc_asset_id.map(str::to_string),
    }
}

fn network(network_id: u32, hrp: &str, x: &str, asset: &str, c: &str) -> NetworkConfig {
    NetworkConfig {
        network_id,
        hrp: hrp.to_string(),
        chains: vec![
            chain(x, "X", "avm", Some(asset)),
            chain(PLATFORM_CHAIN_ID, "P", "platformvm", Some(asset)),
            chain(c, "C", "evm", None),
        ],
    }
}

/// The built-in configuration for `network_id`, if there is one.
pub fn network_config(network_id: u32) -> Option<NetworkConfig> {
    match network_id {
        1 => Some(network(
            1,
            "axc",
            "2oYMBNV4eNHyqk2fjjV5nVQLDbtmNJzq5s3qs3Lo6ftnC6FByM",
            "FvwEAhmxKfeiG8SnEvq42hc6whRyY3EFYAvebMqDNDGCgxN5Z",
            "2CA6j5zYzasynPsFeNoqWkmTCt3VScMvXUZHbfDJ8k3oGzAPtU",
        )),
        5 => Some(network(
            5,
            "fuji",
            "2JVSBoinj9C2J33VntvzYtVJNZdN2NKiwwKjcumHUWEb5DbBrm",
            "U8iRqJoiJm8xZHAacmvYyZVwqQx6uDNtQeP3CQ6fcgQk3JqnK",
            "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp",
        )),
        12345 => Some(network(
            12345,
            "local",
            "2eNy1mUFdmaxXNj1eQHUe7Np4gju9sJsEtWQ4MX3ToiNKuADed",
            "2fombhL7aGPwj3KH4bfrmJwW6PVnMobf9Y2fn9GwxiAAJyFDbe",
            "2CA6j5zYzasynPsFeNoqWkmTCt3VScMvXUZHbfDJ8k3oGzAPtU",
        )),
        _ => None,
    }
}

/// The HRP addresses on `network_id` use.
pub fn hrp_for(network_id: u32) -> String {
    network_config(network_id)
        .map(|n| n.hrp)
        .unwrap_or_else(|| FALLBACK_HRP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_decode() {
        for id in [1, 5, 12345] {
            let net = network_config(id).unwrap();
            for c in &net.chains {
                c.blockchain_id_bytes().unwrap();
                c.axc_asset_id_bytes().unwrap();
            }
            assert_eq!(net.x_chain().unwrap().vm, "avm");
        }
    }

    #[test]
    fn test_hrp_fallback() {
        assert_eq!(hrp_for(1), "axc");
        assert_eq!(hrp_for(5), "fuji");
        assert_eq!(hrp_for(4242), "custom");
    }

    #[test]
    fn test_json_roundtrip() {
        let net = network_config(5).unwrap();
        let json = serde_json::to_string(&net).unwrap();
        assert!(json.contains("\"networkId\":5"));
        assert_eq!(NetworkConfig::from_json(&json).unwrap(), net);
        assert_eq!(net.chain("X").unwrap().tx_fee, MILLI_AXC);
    }
}
