//! Tests for the JSON-RPC transport and the AVM API.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use axia_avm::builder::SpendOptions;
use axia_avm::outputs::Output;
use axia_avm::utxo_set::PersistedUtxos;
use axia_avm::{AvmError, MergeRule, Utxo, UtxoSet};
use axia_primitives::bintools::cb58_encode;

use crate::api::{AvmApi, IssueTx, Participants};
use crate::error::RpcError;
use crate::transport::{HttpTransport, JsonRpcTransport};
use crate::types::RpcConfig;

const LOCAL_X: &str = "2eNy1mUFdmaxXNj1eQHUe7Np4gju9sJsEtWQ4MX3ToiNKuADed";
const AXC: [u8; 32] = [0xaa; 32];
const A: [u8; 20] = [1u8; 20];
const B: [u8; 20] = [2u8; 20];

fn api_for(server: &MockServer) -> AvmApi<HttpTransport> {
    let config = RpcConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    AvmApi::for_network(HttpTransport::new(config), 12345).unwrap()
}

fn rpc_ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn mount_axc(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/ext/bc/X"))
        .and(body_partial_json(json!({ "method": "avm.getAssetDescription" })))
        .respond_with(rpc_ok(json!({
            "assetID": cb58_encode(&AXC),
            "name": "Axia",
            "symbol": "AXC",
            "denomination": "9"
        })))
        .mount(server)
        .await;
}

fn utxo(tx: u8, amount: u64, owner: [u8; 20]) -> Utxo {
    Utxo::new([tx; 32], 0, AXC, Output::secp_transfer(amount, vec![owner], 0, 1))
}

fn opts() -> SpendOptions {
    SpendOptions { as_of: 1000, ..SpendOptions::default() }
}

#[tokio::test]
async fn test_transport_posts_envelope_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ext/bc/X"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "jsonrpc": "2.0", "method": "avm.getTxStatus" })))
        .respond_with(rpc_ok(json!({ "status": "Accepted" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(RpcConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        ..Default::default()
    });
    let result = transport
        .call_method("avm.getTxStatus", json!({ "txID": "abc" }))
        .await
        .unwrap();
    assert_eq!(result["status"], "Accepted");
}

#[tokio::test]
async fn test_rpc_error_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "couldn't parse tx" }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .get_tx_status("abc", &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        RpcError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "couldn't parse tx");
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .get_tx_status("abc", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::ServerError { status_code: 503, .. }));
}

#[tokio::test]
async fn test_missing_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1 })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .get_tx_status("abc", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::MissingResult(ref m) if m == "avm.getTxStatus"));
}

#[tokio::test]
async fn test_cancelled_before_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!({ "status": "Accepted" })).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = api.get_tx_status("abc", &cancel).await.unwrap_err();
    assert!(matches!(err, RpcError::Cancelled));
}

#[tokio::test]
async fn test_cancelled_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!({ "status": "Accepted" })).set_delay(std::time::Duration::from_secs(30)))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });
    let err = api.get_tx_status("abc", &cancel).await.unwrap_err();
    assert!(matches!(err, RpcError::Cancelled));
}

#[tokio::test]
async fn test_get_utxos_decodes_page() {
    let server = MockServer::start().await;
    let u1 = utxo(1, 500, A);
    let u2 = utxo(2, 700, A);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "avm.getUTXOs",
            "params": { "limit": 2, "sourceChain": "P" }
        })))
        .respond_with(rpc_ok(json!({
            "numFetched": "2",
            "utxos": [u1.to_string(), u2.to_string()],
            "endIndex": { "address": "X-local1xyz", "utxo": u2.id() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let addr = api.address_from_buffer(&A).unwrap();
    let page = api
        .get_utxos(&[addr.as_str()], Some("P"), 2, None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(page.num_fetched, 2);
    assert_eq!(page.utxos.len(), 2);
    assert!(page.utxos.includes(&u1.id()));
    assert_eq!(page.end_index.unwrap().utxo, u2.id());
}

#[tokio::test]
async fn test_get_utxos_reconciled_with_cache() {
    let server = MockServer::start().await;
    let fresh = utxo(2, 700, A);
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!({ "numFetched": 1, "utxos": [fresh.to_string()] })))
        .mount(&server)
        .await;

    let mut cached = UtxoSet::new();
    cached.add(utxo(1, 500, A), false);
    cached.add(fresh.clone(), false);
    let persisted = PersistedUtxos::from_set("wallet", 1, &cached);

    let api = api_for(&server);
    let addr = api.address_from_buffer(&A).unwrap();
    let cancel = CancellationToken::new();

    let union = api
        .get_utxos_reconciled(&[addr.as_str()], &persisted, MergeRule::Union, &cancel)
        .await
        .unwrap();
    assert_eq!(union.len(), 2);

    let stale = api
        .get_utxos_reconciled(&[addr.as_str()], &persisted, MergeRule::Complement, &cancel)
        .await
        .unwrap();
    assert_eq!(stale.get_utxo_ids(&[], None), vec![utxo(1, 500, A).id()]);
}

#[tokio::test]
async fn test_get_balance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "avm.getBalance" })))
        .respond_with(rpc_ok(json!({
            "balance": "299999999999900",
            "utxoIDs": [{ "txID": "abc", "outputIndex": 1 }]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let addr = api.address_from_buffer(&A).unwrap();
    let resp = api
        .get_balance(&addr, "AXC", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(resp.balance, 299_999_999_999_900);
    assert_eq!(resp.utxo_ids.len(), 1);

    let err = api
        .get_balance("P-local1qqqq", "AXC", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Avm(AvmError::Address(_))));
}

#[tokio::test]
async fn test_axc_asset_id_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "avm.getAssetDescription",
            "params": { "assetID": "AXC" }
        })))
        .respond_with(rpc_ok(json!({
            "assetID": cb58_encode(&AXC),
            "name": "Axia",
            "symbol": "AXC",
            "denomination": 9
        })))
        .expect(2)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let cancel = CancellationToken::new();
    assert_eq!(api.get_axc_asset_id(false, &cancel).await.unwrap(), AXC);
    assert_eq!(api.get_axc_asset_id(false, &cancel).await.unwrap(), AXC);
    assert_eq!(api.get_axc_asset_id(true, &cancel).await.unwrap(), AXC);
}

#[test]
fn test_fee_schedule() {
    let api = AvmApi::for_network(HttpTransport::new(RpcConfig::default()), 12345).unwrap();
    assert_eq!(api.get_tx_fee(), 1_000_000);
    assert_eq!(api.get_creation_tx_fee(), 10_000_000);
    assert_eq!(api.get_mint_tx_fee(), 1_000_000);
    api.set_tx_fee(42);
    assert_eq!(api.get_tx_fee(), 42);
    assert_eq!(api.get_default_tx_fee(), 1_000_000);
    assert_eq!(api.blockchain_alias(), Some("X"));
    assert_eq!(api.blockchain_id(), LOCAL_X);
}

#[test]
fn test_parse_address_is_strict() {
    let api = AvmApi::for_network(HttpTransport::new(RpcConfig::default()), 12345).unwrap();
    let x = api.address_from_buffer(&A).unwrap();
    assert!(x.starts_with("X-local1"));
    assert_eq!(api.parse_address(&x), Some(A));
    let p = x.replacen("X-", "P-", 1);
    assert_eq!(api.parse_address(&p), None);
    let by_id = x.replacen("X-", &format!("{}-", LOCAL_X), 1);
    assert_eq!(api.parse_address(&by_id), Some(A));
}

#[tokio::test]
async fn test_issue_tx_rejects_garbage_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_ok(json!({ "txID": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .issue_tx(IssueTx::Bytes(vec![0, 0, 0, 9]), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Transaction(ref m) if m.starts_with("AVMAPI.issueTx")));
}

#[tokio::test]
async fn test_build_sign_and_issue() {
    let server = MockServer::start().await;
    mount_axc(&server).await;

    let api = api_for(&server);
    let mut keychain = api.key_chain();
    let owner = keychain.make_key().address();
    let owner_str = api.address_from_buffer(&owner).unwrap();
    let to_str = api.address_from_buffer(&B).unwrap();

    let mut set = UtxoSet::new();
    set.add(utxo(1, 10_000_000_000, owner), false);

    let cancel = CancellationToken::new();
    let who = Participants {
        to: &[to_str.as_str()],
        from: &[owner_str.as_str()],
        change: &[],
    };
    let utx = api
        .build_base_tx(&set, 1_000_000_000, &AXC, &who, &opts(), &cancel)
        .await
        .unwrap();
    assert_eq!(utx.burn(&AXC), api.get_tx_fee());
    assert!(api.check_goose_egg(&utx, 0, &cancel).await.unwrap());

    let tx = utx.sign(&keychain).unwrap();
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "avm.issueTx",
            "params": { "tx": tx.to_cb58() }
        })))
        .respond_with(rpc_ok(json!({ "txID": tx.id() })))
        .expect(1)
        .mount(&server)
        .await;

    let id = api.issue_tx(IssueTx::Tx(tx.clone()), &cancel).await.unwrap();
    assert_eq!(id, tx.id());
}

#[tokio::test]
async fn test_build_base_tx_rejects_foreign_address_before_network() {
    let server = MockServer::start().await;
    let api = api_for(&server);
    let from = api.address_from_buffer(&A).unwrap();
    let wrong = from.replacen("X-", "P-", 1);
    let who = Participants {
        to: &[wrong.as_str()],
        from: &[from.as_str()],
        change: &[],
    };
    let err = api
        .build_base_tx(&UtxoSet::new(), 1, &AXC, &who, &opts(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "AVMAPI.buildBaseTx: Invalid address format");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_build_import_tx_without_atomics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "avm.getUTXOs" })))
        .respond_with(rpc_ok(json!({ "numFetched": "0", "utxos": [] })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let owner = api.address_from_buffer(&A).unwrap();
    let who = Participants {
        to: &[owner.as_str()],
        from: &[owner.as_str()],
        change: &[],
    };
    let source = "11111111111111111111111111111111LpoYY";
    let err = api
        .build_import_tx(
            &UtxoSet::new(),
            &[owner.as_str()],
            source,
            &who,
            &opts(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "AVMAPI.buildImportTx: No atomic UTXOs to import from {} using addresses: {}",
            source, owner
        )
    );
}

#[tokio::test]
async fn test_build_import_tx_rejects_bad_owner_before_network() {
    let server = MockServer::start().await;
    let api = api_for(&server);
    let owner = api.address_from_buffer(&A).unwrap();
    let who = Participants {
        to: &[owner.as_str()],
        from: &[owner.as_str()],
        change: &[],
    };
    let foreign = owner.replacen("X-", "P-", 1);
    for bad in ["not-an-address", foreign.as_str()] {
        let err = api
            .build_import_tx(
                &UtxoSet::new(),
                &[owner.as_str(), bad],
                "11111111111111111111111111111111LpoYY",
                &who,
                &opts(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "AVMAPI.buildImportTx: Invalid address format");
    }
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_build_import_tx_spends_atomics() {
    let server = MockServer::start().await;
    mount_axc(&server).await;
    let atomic = utxo(7, 5_000_000, A);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "avm.getUTXOs" })))
        .respond_with(rpc_ok(json!({ "numFetched": "1", "utxos": [atomic.to_string()] })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let owner = api.address_from_buffer(&A).unwrap();
    let who = Participants {
        to: &[owner.as_str()],
        from: &[owner.as_str()],
        change: &[],
    };
    let utx = api
        .build_import_tx(
            &UtxoSet::new(),
            &[owner.as_str()],
            "11111111111111111111111111111111LpoYY",
            &who,
            &opts(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(utx.burn(&AXC), 1_000_000);
    assert_eq!(utx.output_total(&AXC), 4_000_000);
}

#[tokio::test]
async fn test_build_export_tx_bad_destination() {
    let server = MockServer::start().await;
    let api = api_for(&server);
    let owner = api.address_from_buffer(&A).unwrap();
    let to = owner.replacen("X-", "P-", 1);
    let who = Participants {
        to: &[to.as_str()],
        from: &[owner.as_str()],
        change: &[],
    };
    let short_chain = cb58_encode(&[1u8; 20]);
    let err = api
        .build_export_tx(&UtxoSet::new(), 10, &short_chain, &who, None, &opts(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "AVMAPI.buildExportTx: Destination ChainID must be 32 bytes in length."
    );
}

#[tokio::test]
async fn test_build_export_tx_to_platform_chain() {
    let server = MockServer::start().await;
    mount_axc(&server).await;

    let api = api_for(&server);
    let owner = api.address_from_buffer(&A).unwrap();
    let to = api.address_from_buffer(&B).unwrap().replacen("X-", "P-", 1);
    let who = Participants {
        to: &[to.as_str()],
        from: &[owner.as_str()],
        change: &[],
    };
    let mut set = UtxoSet::new();
    set.add(utxo(1, 50_000_000, A), false);

    let utx = api
        .build_export_tx(
            &set,
            20_000_000,
            "11111111111111111111111111111111LpoYY",
            &who,
            None,
            &opts(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(utx.burn(&AXC), 1_000_000);
    assert_eq!(utx.output_total(&AXC), 49_000_000);
}
