//! Media Player State Machine
//!
//! A player with a composite "NotPlaying" state and an aliased error state.
//!
//! Key concepts:
//! - Composite states and equivalence queries (`is_in`, `watch_state_is`)
//! - `copy_similar_transitions` to alias a state without self-loops
//! - The transition journal
//!
//! Run with: cargo run --example media_player

use std::sync::Arc;
use switchyard::machine::StateMachine;
use switchyard::state_enum;
use switchyard::StateGraph;

state_enum! {
    enum Player {
        Stopped,
        Playing,
        PausedTrack,
        Faulted,
        NotPlaying,
    }
    initial: [Stopped]
    final: [Faulted]
    composite: { NotPlaying => [Stopped, PausedTrack] }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
enum Control {
    Play,
    Pause,
    Stop,
    Break,
}

fn main() {
    env_logger::init();

    println!("=== Media Player State Machine ===\n");

    let graph = StateGraph::builder()
        .transitions(
            Player::Stopped,
            [(Control::Play, Player::Playing), (Control::Break, Player::Faulted)],
        )
        .transitions(
            Player::Playing,
            [
                (Control::Pause, Player::PausedTrack),
                (Control::Stop, Player::Stopped),
                (Control::Break, Player::Faulted),
            ],
        )
        // Paused behaves like Playing, minus the edge that would pause an
        // already-paused player.
        .copy_similar_transitions(Player::PausedTrack, &Player::Playing)
        .initial_state(Player::Stopped)
        .expect("Stopped is the initial state")
        .named("media-player")
        .expect("name is fresh")
        .build()
        .expect("player graph builds");

    let machine = StateMachine::new(Arc::new(graph));

    let _quiet = machine.watch_state_is(&[Player::NotPlaying], |quiet| {
        println!("  [watch] quiet = {quiet}");
    });

    machine.initiate();

    println!("Stopped, pressing play / pause / stop:");
    machine.trigger(Control::Play);
    machine.trigger(Control::Pause);
    println!("  paused counts as NotPlaying: {}", machine.is_in(&Player::NotPlaying));
    machine.trigger(Control::Stop);

    println!("\nJournal:");
    for entry in machine.journal().entries() {
        match (&entry.trigger, &entry.from) {
            (Some(trigger), Some(from)) => {
                println!("  {from:?} --{trigger:?}--> {:?}", entry.to)
            }
            _ => println!("  start in {:?}", entry.to),
        }
    }

    println!("\n=== Example Complete ===");
}
