//! Reactive Feed State Machine
//!
//! A download job driven entirely by an external event source.
//!
//! Key concepts:
//! - `react`: mapping an event stream onto triggers
//! - A start trigger fired by `initiate`
//! - Final states releasing reactive bindings automatically
//! - Sharing a graph through a `GraphRegistry`
//!
//! Run with: cargo run --example reactive_feed

use std::sync::Arc;
use switchyard::machine::StateMachine;
use switchyard::notify::Publisher;
use switchyard::state_enum;
use switchyard::{GraphRegistry, StateGraph};

state_enum! {
    enum Download {
        Pending,
        Connecting,
        Transferring,
        Complete,
    }
    initial: [Pending]
    final: [Complete]
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
enum Event {
    Connect,
    FirstByte,
    Eof,
}

fn main() {
    env_logger::init();

    println!("=== Reactive Feed State Machine ===\n");

    let graph = StateGraph::builder()
        .transitions(Download::Pending, [(Event::Connect, Download::Connecting)])
        .transitions(
            Download::Connecting,
            [(Event::FirstByte, Download::Transferring)],
        )
        .transitions(Download::Transferring, [(Event::Eof, Download::Complete)])
        .initial_state(Download::Pending)
        .expect("Pending is the initial state")
        .starts_with(Event::Connect)
        .expect("start trigger is fresh")
        .named("download")
        .expect("name is fresh")
        .build()
        .expect("download graph builds");

    let registry = GraphRegistry::new();
    registry.register(Arc::new(graph)).expect("name is free");

    let machine = StateMachine::<Download, Event>::from_registry(&registry, "download")
        .expect("graph was registered");

    let _progress = machine.subscribe(|state: &Download| {
        println!("  -> {state:?}");
    });

    let network: Publisher<Event> = Publisher::new();
    machine.react(&network, |event: &Event| event.clone());

    // initiate commits Pending, then fires the configured Connect trigger.
    machine.initiate();

    println!("\nFeeding network events:");
    network.emit(&Event::FirstByte);
    network.emit(&Event::Eof);

    println!("\nFinal state: {:?}", machine.state());
    println!(
        "Bindings left on the source after completion: {}",
        network.observer_count()
    );

    println!("\n=== Example Complete ===");
}
