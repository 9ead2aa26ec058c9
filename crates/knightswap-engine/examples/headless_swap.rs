//! Scripted swap session against the headless engine.
//!
//! Run with:
//!   RUST_LOG=knightswap_engine=debug cargo run --example headless_swap -p knightswap-engine
//!
//! Optionally pass a JSON config override as the first argument:
//!   cargo run --example headless_swap -p knightswap-engine -- '{"cooldown_secs": 0.5}'

use knightswap_engine::prelude::*;

const FRAME_DT: f32 = 1.0 / 60.0;

/// One scripted input: a key press after some idle frames.
struct Step {
    idle_frames: u32,
    key: &'static str,
}

const SCRIPT: &[Step] = &[
    Step { idle_frames: 0, key: "Two" },
    // Still cooling down: rejected.
    Step { idle_frames: 10, key: "Three" },
    Step { idle_frames: 240, key: "Three" },
    // Already Catwoman: rejected.
    Step { idle_frames: 240, key: "Three" },
    Step { idle_frames: 0, key: "Four" },
    // Unbound: ignored.
    Step { idle_frames: 240, key: "Nine" },
    Step { idle_frames: 0, key: "One" },
];

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(json) => SwapConfig::from_json_str(&json)?,
        None => SwapConfig::default(),
    };
    let mut controller = SwitchController::new(config)?;

    let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
    engine.set_vitals(PersistentVitals {
        health: 80,
        armor: ArmorPool::new(3, 2),
        catwoman_armor: ArmorPool::new(1, 1),
    });
    engine.set_world_flag("BatmanDamageLevel2", true);

    for step in SCRIPT {
        for _ in 0..step.idle_frames {
            controller.on_tick(FRAME_DT);
        }
        match controller.on_key_down(&mut engine, step.key)? {
            Some(SwitchOutcome::Completed(report)) => println!(
                "{:>5}: {} -> {} (damage {}, phases {:?})",
                step.key, report.from, report.to, report.damage_level, report.phases
            ),
            Some(SwitchOutcome::Rejected(reason)) => {
                println!("{:>5}: rejected, {reason}", step.key)
            }
            None => println!("{:>5}: not bound", step.key),
        }
    }

    let vitals = engine.vitals();
    println!(
        "final: {} with health {}, {} actor(s) alive",
        engine.possessed_name().unwrap_or_default(),
        vitals.health,
        engine.actor_count()
    );
    Ok(())
}
