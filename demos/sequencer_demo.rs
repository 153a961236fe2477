//! Sequencer Engine Tour
//!
//! Simulates a host loop driving two sequencer engines: a square clock
//! at eight samples per cycle, a reset pulse at play start, and
//! per-sample processing throughout.
//!
//! Run with: cargo run --example sequencer_demo

use gatework::prelude::*;

const SAMPLES_PER_PULSE: usize = 8;

fn trigger_marker(trigger: bool) -> &'static str {
    if trigger {
        "  *"
    } else {
        ""
    }
}

/// Drive one full clock pulse and return the leading-edge output.
fn clock_pulse<const N: usize>(sequencer: &mut PatternSequencer<N>) -> PatternOutput {
    let mut edge = None;
    for sample in 0..SAMPLES_PER_PULSE {
        let clock = if sample < SAMPLES_PER_PULSE / 2 { 10.0 } else { 0.0 };
        let out = sequencer.process(clock, 0.0, 10.0, 0.0);
        if sample == 0 {
            edge = Some(out);
        }
    }
    edge.unwrap()
}

/// Drive one full clock pulse and return the value shifted out.
fn shift_pulse<const N: usize>(register: &mut ShiftRegisterLoop<N>, input: f32) -> f32 {
    let mut shifted = register.output();
    for sample in 0..SAMPLES_PER_PULSE {
        let clock = if sample < SAMPLES_PER_PULSE / 2 { 10.0 } else { 0.0 };
        if let Some(out) = register.process(clock, input) {
            shifted = out;
        }
    }
    shifted
}

fn main() {
    println!("=== Pendulum Pattern ===\n");

    let mut sequencer = PatternSequencer64::new()
        .with_direction(Direction::Pendulum)
        .with_rng(SequenceRng::from_seed(0xbead));
    sequencer.set_length(4);
    for step in 0..4 {
        sequencer.set_step(step, step as f32 * 1.5, true);
    }

    // Hosts pulse reset at play start so the first step sounds
    let seeded = sequencer.process(0.0, 10.0, 10.0, 0.0);
    println!(
        "  reset  step {}  cv {:.1}V{}",
        seeded.step,
        seeded.cv,
        trigger_marker(seeded.trigger)
    );
    sequencer.process(0.0, 0.0, 10.0, 0.0);

    for _ in 0..10 {
        let out = clock_pulse(&mut sequencer);
        println!(
            "  clock  step {}  cv {:.1}V{}",
            out.step,
            out.cv,
            trigger_marker(out.trigger)
        );
    }

    println!("\nBoth end steps repeat once on the way back, the pendulum");
    println!("signature.");

    println!("\n=== One-Shot Playback ===\n");

    let mut sequencer = PatternSequencer64::new().with_one_shot(true);
    sequencer.set_length(4);
    for step in 0..4 {
        sequencer.set_step(step, 2.0 + step as f32, true);
    }

    let seeded = sequencer.process(0.0, 10.0, 10.0, 0.0);
    println!(
        "  reset  step {}  cv {:.1}V{}",
        seeded.step,
        seeded.cv,
        trigger_marker(seeded.trigger)
    );
    sequencer.process(0.0, 0.0, 10.0, 0.0);

    for _ in 0..6 {
        let out = clock_pulse(&mut sequencer);
        if out.ended {
            println!("  clock  (sequence ended, output quiet)");
        } else {
            println!(
                "  clock  step {}  cv {:.1}V{}",
                out.step,
                out.cv,
                trigger_marker(out.trigger)
            );
        }
    }

    // A reset pulse re-arms the one-shot
    let revived = sequencer.process(0.0, 10.0, 10.0, 0.0);
    println!(
        "  reset  step {}  cv {:.1}V{}",
        revived.step,
        revived.cv,
        trigger_marker(revived.trigger)
    );

    println!("\n=== Shift-Register Loop ===\n");

    let mut register = ShiftRegisterLoop::<8>::new().with_rng(SequenceRng::from_seed(0xd1ce));
    let mut melody = SequenceRng::from_seed(0x5eed);

    // Fill the register with a random melody, then lock the loop
    for i in 0..8 {
        register.set_value(i, melody.next_f32() * 10.0);
    }
    register.set_loop_enabled(true);
    register.set_chance(1.0);

    println!("Locked loop, one full pass:");
    for _ in 0..8 {
        let out = shift_pulse(&mut register, 0.0);
        println!("  {:5.2}V |{}", out, "█".repeat(out as usize));
    }

    register.set_mode(LoopMode::Average);
    register.set_chance(0.7);

    println!("\nChance 0.7, averaging fresh CV into the loop:");
    for _ in 0..8 {
        let input = melody.next_f32() * 10.0;
        let out = shift_pulse(&mut register, input);
        println!("  {:5.2}V |{}", out, "█".repeat(out as usize));
    }

    println!("\nAt full chance the loop repeats exactly; backing the chance");
    println!("off lets incoming CV mutate the loop a little on each pass.");
}
