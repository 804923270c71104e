use proptest::prelude::*;

use sova_assets::TokenLedger;
use sova_types::{Address, FungibleAsset};

#[derive(Clone, Debug)]
enum Op {
    Mint(u8, u64),
    Burn(u8, u64),
    Transfer(u8, u8, u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 0u64..1_000_000).prop_map(|(h, a)| Op::Mint(h, a)),
        (0u8..4, 0u64..1_000_000).prop_map(|(h, a)| Op::Burn(h, a)),
        (0u8..4, 0u8..4, 0u64..1_000_000).prop_map(|(f, t, a)| Op::Transfer(f, t, a)),
    ]
}

fn holder(n: u8) -> Address {
    Address::from_label(&format!("holder-{n}"))
}

proptest! {
    /// Sum of balances equals total supply after any sequence of operations,
    /// whether individual operations succeed or fail.
    #[test]
    fn supply_matches_balances(ops in prop::collection::vec(op(), 1..64)) {
        let mut token = TokenLedger::new("SHARE", 8);
        for op in ops {
            let _ = match op {
                Op::Mint(h, a) => token.mint(&holder(h), u128::from(a)),
                Op::Burn(h, a) => token.burn(&holder(h), u128::from(a)),
                Op::Transfer(f, t, a) => token.transfer(&holder(f), &holder(t), u128::from(a)),
            };
            prop_assert_eq!(token.holders_total(), token.total_supply());
        }
    }
}
