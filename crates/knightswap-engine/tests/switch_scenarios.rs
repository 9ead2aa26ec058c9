//! End-to-end swap scenarios against the headless engine.
//!
//! Each test drives a full session through the public API only: key
//! presses, ticks and swap requests, then inspects the headless world.

use knightswap_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn body_at(x: f32, y: f32, z: f32, yaw: i32) -> Transform {
    Transform::new(Vec3::new(x, y, z), Rotator::new(0, yaw, 0))
}

fn no_effect_config() -> SwapConfig {
    SwapConfig {
        effect_enabled: false,
        ..Default::default()
    }
}

fn drain_cooldown(ctl: &mut SwitchController) {
    while !ctl.is_ready() {
        ctl.on_tick(1.0 / 30.0);
    }
}

// ---------------------------------------------------------------------------
// Batman -> Catwoman
// ---------------------------------------------------------------------------

#[test]
fn batman_to_catwoman_preserves_player_state() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    let camera = Transform::new(Vec3::new(-300.0, 40.5, 220.0), Rotator::new(-2000, 32768, 0));
    let body = body_at(-120.0, 40.5, 96.0, 32768);
    engine.place_camera(camera);
    engine.place_character(body);
    engine.set_vitals(PersistentVitals {
        health: 80,
        armor: ArmorPool::new(3, 2),
        catwoman_armor: ArmorPool::new(1, 1),
    });
    engine.set_detective_vision_flag(false);

    let mut ctl = SwitchController::new(SwapConfig::default()).unwrap();
    assert_eq!(ctl.cooldown_remaining(), 0.0);

    let outcome = ctl
        .request_switch(&mut engine, CharacterIdentity::Catwoman)
        .unwrap();
    let report = outcome.report().expect("swap should complete");
    assert_eq!(report.from, "Batman");

    // Catwoman's packages were requested.
    assert!(engine.calls().contains(&HostCall::LoadPackage("Playable_Catwoman_SF".to_owned())));
    assert!(engine.calls().contains(&HostCall::LoadPackage(
        "Playable_Catwoman_Standard_SF".to_owned()
    )));

    // The new body is Catwoman, at the old body's transform.
    let new = engine.possessed().unwrap();
    let actor = engine.actor(new).unwrap();
    assert_eq!(actor.internal_name, "Catwoman");
    assert_eq!(actor.transform, body);
    assert_eq!(engine.camera(), camera);

    // Health carried over, Catwoman pool applied, default pool kept.
    let vitals = engine.vitals();
    assert_eq!(vitals.health, 80);
    assert_eq!(vitals.armor, ArmorPool::new(3, 2));
    assert_eq!(actor.armor, Some(ArmorPool::new(1, 1)));
    assert_eq!(engine.health_bar_refreshes(), 1);

    // Catwoman has no forensics device.
    assert!(!engine.detective_vision(ControllerHandle(1)));

    assert_eq!(ctl.cooldown_remaining(), ctl.config().cooldown_secs);
    assert_eq!(engine.actor_count(), 1);
}

#[test]
fn catwoman_back_to_batman_uses_default_pool() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Catwoman);
    engine.set_vitals(PersistentVitals {
        health: 42,
        armor: ArmorPool::new(5, 6),
        catwoman_armor: ArmorPool::new(7, 8),
    });
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    ctl.request_switch(&mut engine, CharacterIdentity::Batman).unwrap();

    let actor = engine.actor(engine.possessed().unwrap()).unwrap();
    assert_eq!(actor.internal_name, "Batman");
    assert_eq!(actor.armor, Some(ArmorPool::new(5, 6)));
    assert_eq!(engine.vitals().catwoman_armor, ArmorPool::new(7, 8));
}

// ---------------------------------------------------------------------------
// Detective vision
// ---------------------------------------------------------------------------

#[test]
fn detective_vision_carries_between_forensics_characters() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    engine.set_detective_vision_flag(true);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    ctl.request_switch(&mut engine, CharacterIdentity::Nightwing).unwrap();
    assert!(engine.detective_vision(ControllerHandle(1)));
}

#[test]
fn detective_vision_drops_without_forensics() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    engine.set_detective_vision_flag(true);
    engine.set_forensics("Robin", false);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    ctl.request_switch(&mut engine, CharacterIdentity::Robin).unwrap();
    assert!(!engine.detective_vision(ControllerHandle(1)));
}

// ---------------------------------------------------------------------------
// Assets and damage
// ---------------------------------------------------------------------------

#[test]
fn story_dlc_loads_dlc_assets() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Catwoman);
    engine.set_story_dlc(true);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    let outcome = ctl.request_switch(&mut engine, CharacterIdentity::Robin).unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.plan.base_package, "Playable_Robin_HQ_SF");
    assert_eq!(report.plan.skin_id, "Playable_Robin_HQ_Standard");
    assert!(engine.is_package_loaded("Playable_Robin_HQ_Standard_SF"));
    assert!(!engine.is_package_loaded("Playable_Robin_SF"));

    let actor = engine.actor(engine.possessed().unwrap()).unwrap();
    assert_eq!(actor.skin_id, "Playable_Robin_HQ_Standard");
}

#[test]
fn damage_level_reaches_the_spawned_character() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Robin);
    engine.set_world_flag("BatmanDamageLevel3", true);
    engine.set_world_flag("BatmanDamageLevel6", true);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    let outcome = ctl.request_switch(&mut engine, CharacterIdentity::Batman).unwrap();
    assert_eq!(outcome.report().unwrap().damage_level, 6);
    assert!(engine.calls().contains(&HostCall::SpawnCharacter {
        skin_id: "Playable_Batman_Standard".to_owned(),
        damage_level: 6,
    }));
    assert_eq!(engine.actor(engine.possessed().unwrap()).unwrap().damage_level, 6);
}

#[test]
fn damage_flags_do_not_apply_to_untracked_characters() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    engine.set_world_flag("NightwingDamageLevel4", true);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    let outcome = ctl.request_switch(&mut engine, CharacterIdentity::Nightwing).unwrap();
    assert_eq!(outcome.report().unwrap().damage_level, 0);
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

#[test]
fn effect_plays_at_the_body_with_configured_scale() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    let body = body_at(10.0, 20.0, 30.0, 0);
    engine.place_character(body);
    let config = SwapConfig {
        effect_path: "FX_Custom.P_Swap".to_owned(),
        effect_scale: 2.5,
        ..Default::default()
    };
    engine.register_object("FX_Custom.P_Swap");
    let mut ctl = SwitchController::new(config).unwrap();

    ctl.request_switch(&mut engine, CharacterIdentity::Robin).unwrap();

    assert_eq!(engine.effects().len(), 1);
    let effect = &engine.effects()[0];
    assert_eq!(effect.path, "FX_Custom.P_Swap");
    assert_eq!(effect.at, body);
    assert_eq!(effect.scale, 2.5);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn rejected_requests_change_nothing() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    let mut ctl = SwitchController::new(SwapConfig::default()).unwrap();

    engine.set_controller_state(ControllerState {
        has_cinematic_handle: true,
        ..Default::default()
    });
    engine.clear_calls();
    let outcome = ctl.request_switch(&mut engine, CharacterIdentity::Robin).unwrap();
    assert_eq!(
        outcome.rejection(),
        Some(&RejectReason::Unsafe(UnsafeCondition::ActiveCinematicHandle))
    );
    assert!(engine.calls().is_empty());
    assert!(ctl.is_ready());

    engine.set_controller_state(ControllerState::default());
    engine.invalidate(SessionObject::PersistentData);
    let outcome = ctl.request_switch(&mut engine, CharacterIdentity::Robin).unwrap();
    assert_eq!(
        outcome.rejection(),
        Some(&RejectReason::InvalidReference(SessionObject::PersistentData))
    );
    assert!(engine.calls().is_empty());
    assert_eq!(engine.possessed_name().as_deref(), Some("Batman"));
}

#[test]
fn every_target_is_rejected_during_cooldown() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();
    ctl.request_switch(&mut engine, CharacterIdentity::Batman).unwrap();
    engine.clear_calls();

    for target in CharacterIdentity::ALL {
        let outcome = ctl.request_switch(&mut engine, target).unwrap();
        assert!(
            matches!(outcome.rejection(), Some(RejectReason::CooldownActive { .. })),
            "{target} should hit the cooldown"
        );
    }
    assert!(engine.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Key bindings
// ---------------------------------------------------------------------------

#[test]
fn key_presses_cycle_through_the_roster() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
    let mut ctl = SwitchController::new(no_effect_config()).unwrap();

    for (key, expected) in [
        ("Two", "Batman"),
        ("Three", "Catwoman"),
        ("Four", "Robin"),
        ("Five", "Nightwing"),
        ("One", "BruceWayne"),
    ] {
        let outcome = ctl.on_key_down(&mut engine, key).unwrap().unwrap();
        assert!(outcome.is_completed(), "{key} should switch: {outcome:?}");
        assert_eq!(engine.possessed_name().as_deref(), Some(expected));
        drain_cooldown(&mut ctl);
    }

    // Only the current body survives.
    assert_eq!(engine.actor_count(), 1);
}

#[test]
fn custom_bindings_are_honored() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    let bindings = KeyBindings::new([("F5".to_owned(), CharacterIdentity::Nightwing)]).unwrap();
    let mut ctl = SwitchController::with_bindings(no_effect_config(), bindings).unwrap();

    assert_eq!(ctl.on_key_down(&mut engine, "Five").unwrap(), None);
    let outcome = ctl.on_key_down(&mut engine, "F5").unwrap().unwrap();
    assert!(outcome.is_completed());
    assert_eq!(engine.possessed_name().as_deref(), Some("Nightwing"));
}

// ---------------------------------------------------------------------------
// Mid-switch failure
// ---------------------------------------------------------------------------

#[test]
fn failure_after_destroy_is_not_rolled_back() {
    let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
    let old = engine.possessed().unwrap();
    let config = SwapConfig {
        effect_path: "FX.NotLoaded".to_owned(),
        ..Default::default()
    };
    let mut ctl = SwitchController::new(config).unwrap();

    let err = ctl
        .request_switch(&mut engine, CharacterIdentity::Catwoman)
        .unwrap_err();
    assert_eq!(err.phase, SwitchPhase::PlayingEffect);
    assert!(!engine.is_alive(old));
    assert_eq!(engine.possessed_name().as_deref(), Some("Catwoman"));
    // The cooldown is only reset by a completed swap.
    assert!(ctl.is_ready());
}
