//! Turnstile State Machine
//!
//! The classic coin-operated turnstile, with a guard and enter/exit hooks.
//!
//! Key concepts:
//! - Guarded transitions (`only_if`)
//! - Enter/exit hooks that observe transitions
//! - Non-mutating probes: `can_trigger` vs `might_trigger`
//!
//! Run with: cargo run --example turnstile

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use switchyard::machine::StateMachine;
use switchyard::state_enum;
use switchyard::{HandlerResult, StateGraph};

state_enum! {
    enum Turnstile {
        Locked,
        Unlocked,
    }
    initial: [Locked]
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
enum Action {
    Coin,
    Push,
}

fn main() {
    env_logger::init();

    println!("=== Turnstile State Machine ===\n");

    let graph = StateGraph::builder()
        .transitions(Turnstile::Locked, [(Action::Coin, Turnstile::Unlocked)])
        .transitions(Turnstile::Unlocked, [(Action::Push, Turnstile::Locked)])
        .initial_state(Turnstile::Locked)
        .expect("Locked is the initial state")
        .build()
        .expect("turnstile graph builds");

    let machine = StateMachine::new(Arc::new(graph));

    // Out of service after three passages.
    let passages = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&passages);
    machine.only_if(Action::Coin, move |_| counter.load(Ordering::SeqCst) < 3);

    let counter = Arc::clone(&passages);
    machine.on_enter(Turnstile::Locked, move |record| {
        if record.from == Turnstile::Unlocked {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        HandlerResult::Continue
    });

    let _watcher = machine.subscribe(|state: &Turnstile| {
        println!("  -> now {state:?}");
    });

    machine.initiate();
    println!("Initial state: {:?}\n", machine.state());

    for round in 1..=4 {
        println!("Round {round}: insert coin, push through");
        if machine.trigger(Action::Coin) == Some(true) {
            machine.trigger(Action::Push);
        } else {
            println!("  coin rejected: out of service");
            println!(
                "  graph still defines Coin here: {}",
                machine.might_trigger(&Action::Coin)
            );
        }
    }

    println!("\nPassages served: {}", passages.load(Ordering::SeqCst));
    println!("\n=== Example Complete ===");
}
