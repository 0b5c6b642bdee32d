use std::collections::BTreeSet;

use proptest::prelude::*;

use axia_avm::builder::{check_export_prefixes, check_goose_egg, BaseTxRequest, SpendOptions, TxContext};
use axia_avm::outputs::Output;
use axia_avm::{AvmError, MergeRule, Utxo, UtxoSet};

const AXC: [u8; 32] = [0xaa; 32];
const A: [u8; 20] = [1u8; 20];
const B: [u8; 20] = [2u8; 20];

fn set_from(seeds: &[(u8, u64)]) -> UtxoSet {
    let mut set = UtxoSet::new();
    for (tx, amount) in seeds {
        set.add(
            Utxo::new([*tx; 32], 0, AXC, Output::secp_transfer(*amount, vec![A], 0, 1)),
            true,
        );
    }
    set
}

fn ids(set: &UtxoSet) -> BTreeSet<String> {
    set.get_all_utxos().iter().map(|u| u.id()).collect()
}

fn seeds() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::vec((0u8..16, 1u64..1_000_000), 0..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merge_rules_follow_set_algebra(a in seeds(), b in seeds()) {
        let sa = set_from(&a);
        let sb = set_from(&b);
        let (ia, ib) = (ids(&sa), ids(&sb));

        let union = sa.merge_by_rule(&sb, MergeRule::Union);
        prop_assert_eq!(union.len(), ia.union(&ib).count());

        let inter = sa.merge_by_rule(&sb, MergeRule::Intersection);
        prop_assert_eq!(ids(&inter), ia.intersection(&ib).cloned().collect::<BTreeSet<_>>());

        let complement = sa.merge_by_rule(&sb, MergeRule::Complement);
        prop_assert!(ids(&complement).iter().all(|id| !ib.contains(id)));

        let sym = sa.merge_by_rule(&sb, MergeRule::SymDifference);
        prop_assert_eq!(sym.len(), ia.symmetric_difference(&ib).count());
    }

    #[test]
    fn built_base_tx_passes_goose_egg(
        amounts in prop::collection::vec(1u64..50_000_000_000, 1..6),
        amount in 1u64..10_000_000_000,
        fee in 0u64..30_000_000_000,
    ) {
        let seeds: Vec<(u8, u64)> = amounts.iter().enumerate().map(|(i, a)| (i as u8, *a)).collect();
        let set = set_from(&seeds);
        let ctx = TxContext { network_id: 12345, blockchain_id: [0xbb; 32], fee_asset_id: AXC };
        let req = BaseTxRequest {
            amount,
            asset_id: AXC,
            to: vec![B],
            from: vec![A],
            change: vec![A],
            fee,
        };
        let opts = SpendOptions { as_of: 0, ..SpendOptions::default() };
        match set.build_base_tx(&ctx, &req, &opts) {
            Ok(utx) => {
                prop_assert!(check_goose_egg(&utx, &AXC, 0));
                prop_assert_eq!(utx.burn(&AXC), fee);
            }
            Err(AvmError::GooseEggCheck(_)) | Err(AvmError::InsufficientFunds { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn mixed_export_prefixes_rejected(
        n_x in 1usize..4,
        n_p in 1usize..4,
        tail in "[a-z0-9]{6}",
    ) {
        let mut to: Vec<String> = (0..n_x).map(|i| format!("X-local1{}{}", tail, i)).collect();
        to.extend((0..n_p).map(|i| format!("P-local1{}{}", tail, i)));
        let refs: Vec<&str> = to.iter().map(String::as_str).collect();
        prop_assert!(matches!(check_export_prefixes(&refs), Err(AvmError::Address(_))));
    }
}
