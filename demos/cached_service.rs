//! Serving balances through the cache.
//!
//! Reads go through an in-memory cache; writes are routed through
//! `BalanceService::mutate` so the group's entry is dropped and the next
//! read reflects the change.

use settle_engine::prelude::*;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let flat = GroupId::new("flat-42");
    let mut snap = GroupSnapshot::new(Group::new(flat.clone(), CurrencyCode::new("USD")));
    for (id, name) in [("kim", "Kim"), ("lee", "Lee"), ("max", "Max")] {
        snap.members.push(Member::new(id, flat.clone(), name));
    }

    let store = InMemoryStore::new();
    store.put_group(snap).unwrap();

    let cache = Arc::new(InMemoryBalanceCache::new());
    let config = EngineConfig {
        cache_ttl_secs: 60,
        ..Default::default()
    };
    let service = BalanceService::new(store, cache.clone(), config);

    let show = |label: &str| {
        let balances = service
            .get_group_balances(&flat, GetOptions::default())
            .unwrap()
            .unwrap();
        println!("━━━ {} ━━━\n{}\n", label, balances);
    };

    show("Empty flat");

    // Utilities bill of 100.00, paid by Kim, split three ways
    service
        .mutate(&flat, |store| {
            let bill = ExpenseId::new("utilities-march");
            let item = ItemId::new("utilities-march-1");
            store.add_expense(
                &flat,
                Expense::new(bill.clone(), flat.clone(), 10_000),
                vec![ExpenseItem::new(item.clone(), bill.clone(), 10_000, 1)],
                vec![Payer::new(bill, MemberId::new("kim"), 10_000)],
                ["kim", "lee", "max"]
                    .iter()
                    .map(|id| Split::equal(item.clone(), MemberId::new(*id)))
                    .collect(),
            )
        })
        .unwrap();
    println!("cached entries after write: {}", cache.len());
    show("After utilities bill");

    // Lee settles up
    service
        .mutate(&flat, |store| {
            store.record_settlement(
                &flat,
                Settlement::confirmed(flat.clone(), MemberId::new("lee"), MemberId::new("kim"), 3_333),
            )
        })
        .unwrap();
    show("After Lee pays Kim");

    let max = service
        .get_individual_balance(&flat, &MemberId::new("max"))
        .unwrap()
        .unwrap();
    println!("Max owes: {:?}", max.owes_to);
}
