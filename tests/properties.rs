//! Property tests over the synthetic world and event processor invariants
//! named in the spec.

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use eris_director::director::config::DirectorConfig;
use eris_director::director::event::{classify_priority, Event, EventPayload, EventProcessor, Priority};
use eris_director::director::masks::{select_mask, MaskRegistry, MaskState, MaskVariant};
use eris_director::director::world::apply::apply_event;
use eris_director::director::world::diff::WorldDiff;
use eris_director::director::world::state::{PlayerState, WorldState};

fn damage_payload(amount: f32) -> EventPayload {
    EventPayload::Damage { amount, cause: "test".into() }
}

proptest! {
    #[test]
    fn health_stays_within_bounds(amounts in prop::collection::vec(0.0f32..40.0, 1..50)) {
        let config = DirectorConfig::for_testing();
        let mut world = WorldState::from_players([PlayerState::new("alice", "runner")]);
        for (i, amount) in amounts.iter().enumerate() {
            let event = Event { subject: Some("alice".into()), payload: damage_payload(*amount), arrival_time: Duration::from_secs(i as u64) };
            let (next, _diff) = apply_event(&world, &event, &config);
            world = next;
            let alice = &world.players["alice"];
            prop_assert!(alice.health >= 0.0);
            prop_assert!(alice.health <= alice.max_health);
        }
    }

    #[test]
    fn fracture_is_monotonic_except_for_dragon_kill(amounts in prop::collection::vec(0.0f32..20.0, 1..30)) {
        let config = DirectorConfig::for_testing();
        let mut world = WorldState::from_players([PlayerState::new("alice", "runner")]);
        let mut previous = world.fracture;
        for (i, amount) in amounts.iter().enumerate() {
            let event = Event { subject: Some("alice".into()), payload: damage_payload(*amount), arrival_time: Duration::from_secs(i as u64) };
            let (next, _diff) = apply_event(&world, &event, &config);
            world = next;
            prop_assert!(world.fracture >= previous - 1e-6);
            previous = world.fracture;
        }
    }

    #[test]
    fn dragon_kill_relieves_fracture(pre_damage in 0.0f32..40.0) {
        let config = DirectorConfig::for_testing();
        let mut world = WorldState::from_players([PlayerState::new("alice", "runner")]);
        let damage_event = Event { subject: Some("alice".into()), payload: damage_payload(pre_damage), arrival_time: Duration::from_secs(0) };
        let (after_damage, _) = apply_event(&world, &damage_event, &config);
        world = after_damage;
        let before = world.tension;
        let kill_event = Event { subject: Some("alice".into()), payload: EventPayload::DragonKill, arrival_time: Duration::from_secs(1) };
        let (after_kill, _) = apply_event(&world, &kill_event, &config);
        prop_assert!(after_kill.tension <= before);
        prop_assert!(after_kill.victory);
    }

    #[test]
    fn mask_selection_always_lands_on_a_known_variant(seed in any::<u64>(), amount in 0.0f32..20.0) {
        let config = DirectorConfig::default();
        let registry = MaskRegistry::with_defaults();
        let mut debt: HashMap<MaskVariant, f32> = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = MaskState::initial(&config.mask);
        let event = Event { subject: None, payload: damage_payload(amount), arrival_time: Duration::ZERO };
        let next = select_mask(&state, &event, &registry, &mut debt, &config.mask, &mut rng);
        prop_assert!(MaskVariant::ALL.contains(&next.current));
        prop_assert!(next.stability >= config.mask.min_stability);
    }

    #[test]
    fn worlddiff_round_trips_through_json(amount in 0.0f32..20.0) {
        let config = DirectorConfig::for_testing();
        let world = WorldState::from_players([PlayerState::new("alice", "runner")]);
        let event = Event { subject: Some("alice".into()), payload: damage_payload(amount), arrival_time: Duration::ZERO };
        let (_next, diff) = apply_event(&world, &event, &config);
        let json = serde_json::to_string(&diff).unwrap();
        let back: WorldDiff = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.source_name, diff.source_name);
        prop_assert_eq!(back.changes.len(), diff.changes.len());
    }

    #[test]
    fn no_low_priority_event_pops_while_a_fresh_critical_event_waits(low_amount in 0.0f32..5.0) {
        let config = DirectorConfig::default();
        let mut processor = EventProcessor::new(&config);
        processor.submit(EventPayload::MobKill { count: 1, mob_type: "zombie".into() }, None, Duration::from_secs(0), &config);
        processor.submit(EventPayload::DragonKill, None, Duration::from_secs(1), &config);
        let popped = processor.next(&config).unwrap();
        prop_assert_eq!(classify_priority(&popped.payload, &config), Priority::Critical);
        let _ = low_amount;
    }
}

#[test]
fn mask_convergence_every_variant_appears_over_many_events() {
    let config = DirectorConfig::default();
    let registry = MaskRegistry::with_defaults();
    let mut debt: HashMap<MaskVariant, f32> = HashMap::new();
    let mut rng = SmallRng::seed_from_u64(42);
    let mut state = MaskState::initial(&config.mask);
    let mut seen = std::collections::HashSet::new();

    for i in 0..10_000u64 {
        let event = Event { subject: None, payload: damage_payload((i % 17) as f32), arrival_time: Duration::from_secs(i) };
        state = select_mask(&state, &event, &registry, &mut debt, &config.mask, &mut rng);
        seen.insert(state.current);
    }

    assert_eq!(seen.len(), MaskVariant::ALL.len(), "every mask variant should surface over 10,000 events");
}
