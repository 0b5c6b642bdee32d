//! AVM protocol constants: codec version, type IDs, field limits and
//! denominations of the native asset.

/// Codec version prefixed to UTXOs and unsigned transactions.
pub const LATEST_CODEC: u16 = 0;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a transaction, asset or blockchain ID in bytes.
pub const ID_LENGTH: usize = 32;

/// Maximum length of an asset name.
pub const ASSET_NAME_LEN: usize = 128;

/// Maximum length of an asset symbol.
pub const SYMBOL_MAX_LEN: usize = 4;

/// Feature extension IDs used in `InitialStates`.
pub const SECP_FX_ID: u32 = 0;
pub const NFT_FX_ID: u32 = 1;

// ---------------------------------------------------------------------------
// Type IDs
// ---------------------------------------------------------------------------

pub const SECP_XFER_INPUT_ID: u32 = 5;
pub const SECP_MINT_OUTPUT_ID: u32 = 6;
pub const SECP_XFER_OUTPUT_ID: u32 = 7;
pub const SECP_MINT_OP_ID: u32 = 8;
pub const SECP_CREDENTIAL_ID: u32 = 9;
pub const NFT_MINT_OUTPUT_ID: u32 = 10;
pub const NFT_XFER_OUTPUT_ID: u32 = 11;
pub const NFT_MINT_OP_ID: u32 = 12;
pub const NFT_XFER_OP_ID: u32 = 13;
pub const NFT_CREDENTIAL_ID: u32 = 14;

pub const BASE_TX_ID: u32 = 0;
pub const CREATE_ASSET_TX_ID: u32 = 1;
pub const OPERATION_TX_ID: u32 = 2;
pub const IMPORT_TX_ID: u32 = 3;
pub const EXPORT_TX_ID: u32 = 4;

// ---------------------------------------------------------------------------
// Native asset denominations (1 AXC = 10^9 nAXC)
// ---------------------------------------------------------------------------

pub const NANO_AXC: u64 = 1;
pub const MICRO_AXC: u64 = 1_000;
pub const MILLI_AXC: u64 = 1_000_000;
pub const CENTI_AXC: u64 = 10_000_000;
pub const DECI_AXC: u64 = 100_000_000;
pub const ONE_AXC: u64 = 1_000_000_000;

/// Burns up to this amount always pass the goose-egg check.
pub const GOOSE_EGG_LIMIT: u64 = 10 * ONE_AXC;
