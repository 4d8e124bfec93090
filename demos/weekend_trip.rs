//! A weekend trip with mixed split rules.
//!
//! Shows equal, weighted and exact splits, a multi-payer expense and a
//! confirmed settlement, then the suggested transfers that close the books.

use rust_decimal_macros::dec;
use settle_engine::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║   settle-engine: Weekend Trip Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let trip = GroupId::new("weekend-trip");
    let mut snap = GroupSnapshot::new(Group::new(trip.clone(), CurrencyCode::new("EUR")));
    for (id, name) in [("ana", "Ana"), ("ben", "Ben"), ("cai", "Cai"), ("dee", "Dee")] {
        snap.members.push(Member::new(id, trip.clone(), name));
    }
    let everyone = ["ana", "ben", "cai", "dee"];

    // --- Cabin: 2 nights at 180.00, split equally, paid by Ana ---
    let cabin = ExpenseId::new("cabin");
    let nights = ItemId::new("cabin-nights");
    let cabin_total = to_cents(dec!(360.00)).unwrap();
    snap.expenses.push(Expense::new(cabin.clone(), trip.clone(), cabin_total));
    snap.items.push(ExpenseItem::new(
        nights.clone(),
        cabin.clone(),
        to_cents(dec!(180.00)).unwrap(),
        2,
    ));
    snap.payers.push(Payer::new(cabin, MemberId::new("ana"), cabin_total));
    for id in everyone {
        snap.splits.push(Split::equal(nights.clone(), MemberId::new(id)));
    }

    // --- Dinner: Ben's steak is exact, wine by weight, paid by Ben and Cai ---
    let dinner = ExpenseId::new("dinner");
    let steak = ItemId::new("dinner-mains");
    let wine = ItemId::new("dinner-wine");
    let mains_total = to_cents(dec!(96.40)).unwrap();
    let wine_total = to_cents(dec!(45.00)).unwrap();
    let dinner_total = mains_total + wine_total;
    snap.expenses.push(Expense::new(dinner.clone(), trip.clone(), dinner_total));
    snap.items.push(ExpenseItem::new(steak.clone(), dinner.clone(), mains_total, 1));
    snap.items.push(ExpenseItem::new(wine.clone(), dinner.clone(), wine_total, 1));
    snap.payers.push(Payer::new(dinner.clone(), MemberId::new("ben"), to_cents(dec!(100.00)).unwrap()));
    snap.payers.push(Payer::new(
        dinner,
        MemberId::new("cai"),
        dinner_total - to_cents(dec!(100.00)).unwrap(),
    ));
    snap.splits.push(Split::exact(steak.clone(), MemberId::new("ben"), to_cents(dec!(34.90)).unwrap()));
    for id in ["ana", "cai", "dee"] {
        snap.splits.push(Split::equal(steak.clone(), MemberId::new(id)));
    }
    snap.splits.push(Split::weighted(wine.clone(), MemberId::new("ana"), dec!(1)));
    snap.splits.push(Split::weighted(wine.clone(), MemberId::new("ben"), dec!(1.5)));
    snap.splits.push(Split::weighted(wine, MemberId::new("dee"), dec!(2)));

    // --- Dee already paid Ana back 50.00 ---
    snap.settlements.push(Settlement::confirmed(
        trip.clone(),
        MemberId::new("dee"),
        MemberId::new("ana"),
        to_cents(dec!(50.00)).unwrap(),
    ));

    let balances = GroupBalances::compute(&snap, ResidualPolicy::default()).unwrap();
    println!("{}\n", balances);

    println!("━━━ Cai's view ━━━\n");
    let cai = balances.individual(&MemberId::new("cai")).unwrap().unwrap();
    println!("Paid {} / owes {} / net {}", cai.total_paid, cai.total_owed, cai.net_balance);
    for edge in &cai.owes_to {
        println!("  pays {} {}", edge.member_id, edge.amount);
    }
    for edge in &cai.owed_by {
        println!("  receives {} from {}", edge.amount, edge.member_id);
    }
}
