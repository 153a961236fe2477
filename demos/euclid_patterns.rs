//! Euclidean Pattern Explorer
//!
//! Prints a table of classic Euclidean rhythms, shows the shift control
//! rotating one of them, and builds the summary counters an expander
//! module would display.
//!
//! Run with: cargo run --example euclid_patterns

use gatework::prelude::*;

fn pattern_string(euclid: &EuclideanAlgorithm) -> String {
    (0..euclid.length())
        .map(|i| if euclid.pattern(i) { 'X' } else { '.' })
        .collect()
}

fn main() {
    let mut euclid = EuclideanAlgorithm::new();

    println!("=== Euclidean Rhythms ===\n");

    let table = [
        (1, 4),
        (2, 5),
        (3, 8),
        (5, 8),
        (7, 8),
        (4, 9),
        (5, 12),
        (5, 13),
        (7, 16),
        (13, 32),
    ];

    for (hits, length) in table {
        euclid.set(hits, length, 0);
        println!("  E({:2},{:2})  {}", hits, length, pattern_string(&euclid));
    }

    println!("\nE(3,8) is the Cuban tresillo and E(5,8) the cinquillo.");

    println!("\n=== Shift Rotates the Read Position ===\n");

    for shift in 0..4 {
        euclid.set(3, 8, shift);
        println!("  shift {}  {}", shift, pattern_string(&euclid));
    }

    println!("\n=== Expander Counters ===\n");

    euclid.set(5, 13, 0);
    let message = EuclidExpanderMessage::from_pattern(&euclid, 0);
    println!("  E(5,13) on channel {}:", message.channel);
    println!("    beats: {}", message.beat_count);
    println!("    rests: {}", message.rest_count);
    println!("    steps: {}", message.step_count);

    // Publish the counters through the expander mailbox, the way the
    // host module hands them to its neighbor once per frame
    let mut mailbox = ExpanderMailbox::<EuclidExpanderMessage>::new();
    *mailbox.producer_mut() = message;
    mailbox.request_flip();
    mailbox.flip();

    let seen = mailbox.consumer();
    println!(
        "\n  The expander reads {} beats across {} steps.",
        seen.beat_count, seen.step_count
    );
}
