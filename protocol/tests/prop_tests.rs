use proptest::prelude::*;

use sova_protocol::{Action, Protocol, ProtocolConfig};
use sova_types::{Address, Timestamp};

const USERS: [&str; 3] = ["alice", "bob", "carol"];

fn label(s: &str) -> Address {
    Address::from_label(s)
}

fn user(n: usize) -> Address {
    label(USERS[n % USERS.len()])
}

fn action() -> impl Strategy<Value = Action> {
    let amount = 1u64..2_000_000_000;
    prop_oneof![
        amount.clone().prop_map(|a| Action::Deposit {
            asset: label("wbtc"),
            amount: u128::from(a),
            receiver: None,
        }),
        amount.clone().prop_map(|a| Action::Redeem {
            shares: u128::from(a),
            receiver: None,
            owner: None,
        }),
        amount.clone().prop_map(|a| Action::RequestQueuedRedemption { shares: u128::from(a) }),
        amount.clone().prop_map(|a| Action::StakeShares {
            amount: u128::from(a),
            lock_period_secs: 0,
        }),
        amount.clone().prop_map(|a| Action::UnstakeShares { amount: u128::from(a) }),
        (0usize..3, amount).prop_map(|(to, a)| Action::Transfer {
            asset: label("vault"),
            to: user(to),
            amount: u128::from(a),
        }),
        Just(Action::ClaimRewards),
        Just(Action::EmergencyUnstake),
    ]
}

fn deploy() -> Protocol {
    let mut protocol = Protocol::from_config(&ProtocolConfig::default(), Timestamp::new(0)).unwrap();
    for name in USERS {
        for (asset, spender) in [("wbtc", "vault"), ("vault", "staking")] {
            protocol
                .execute(
                    &label(name),
                    Timestamp::new(0),
                    Action::Approve {
                        asset: label(asset),
                        spender: label(spender),
                        amount: u128::MAX,
                    },
                )
                .unwrap();
        }
    }
    protocol
}

proptest! {
    /// A rejected action leaves the whole deployment exactly as it was.
    #[test]
    fn failed_actions_change_nothing(
        steps in prop::collection::vec((0usize..3, 1u64..100_000, action()), 1..40)
    ) {
        let mut protocol = deploy();
        let mut now = 0;
        for (who, dt, action) in steps {
            now += dt;
            let before = protocol.summary().unwrap();
            if protocol.execute(&user(who), Timestamp::new(now), action).is_err() {
                prop_assert_eq!(protocol.summary().unwrap(), before);
            }
        }
    }

    /// Every share is held by a user, by the reward engine, or in vault
    /// custody.
    #[test]
    fn shares_are_conserved(
        steps in prop::collection::vec((0usize..3, 1u64..100_000, action()), 1..40)
    ) {
        let mut protocol = deploy();
        let mut now = 0;
        for (who, dt, action) in steps {
            now += dt;
            let _ = protocol.execute(&user(who), Timestamp::new(now), action);
            let vault = protocol.vault();
            let held: u128 = (0..USERS.len()).map(|n| vault.share_balance(&user(n))).sum::<u128>()
                + vault.share_balance(protocol.staking().address())
                + vault.share_balance(vault.address());
            prop_assert_eq!(held, vault.total_supply());
            prop_assert_eq!(vault.share_balance(vault.address()), vault.shares_in_custody());
        }
    }
}
