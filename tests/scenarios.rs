//! Integration coverage for the six concrete scenarios named in the spec.

use std::sync::Arc;

use eris_director::director::bridge::NullGameBridge;
use eris_director::director::event::EventPayload;
use eris_director::director::model::{FailingModelProvider, ScriptedModelProvider};
use eris_director::director::scenario::{Scenario, ScenarioEvent, ScenarioPlayer, ScenarioRunner};
use eris_director::director::world::state::Phase;

fn players(ids: &[&str]) -> Vec<ScenarioPlayer> {
    ids.iter().map(|id| ScenarioPlayer { id: id.to_string(), role: "runner".to_string() }).collect()
}

#[test]
fn simple_trio_speedrun_reaches_victory_without_deaths() {
    let scenario = Scenario {
        name: "simple_trio_speedrun".into(),
        players: players(&["alice", "bob", "carol"]),
        events: vec![
            ScenarioEvent { at_secs: 0.0, subject: Some("alice".into()), payload: EventPayload::Chat { message: "ready?".into() } },
            ScenarioEvent { at_secs: 30.0, subject: Some("bob".into()), payload: EventPayload::Advancement { name: "enter the nether".into() } },
            ScenarioEvent { at_secs: 120.0, subject: Some("carol".into()), payload: EventPayload::Advancement { name: "enter the end".into() } },
            ScenarioEvent { at_secs: 150.0, subject: Some("alice".into()), payload: EventPayload::DragonKill },
        ],
    };

    let trace = ScenarioRunner::default().run(&scenario);
    assert!(trace.victory);
    assert_eq!(trace.deaths, 0);
}

#[test]
fn nether_disaster_escalates_fracture_without_panicking() {
    let mut events = vec![ScenarioEvent { at_secs: 0.0, subject: Some("alice".into()), payload: EventPayload::Dimension { to: "nether".into() } }];
    for i in 0..10 {
        events.push(ScenarioEvent {
            at_secs: 5.0 * i as f64,
            subject: Some("alice".into()),
            payload: EventPayload::Damage { amount: 8.0, cause: "ghast".into() },
        });
    }
    events.push(ScenarioEvent { at_secs: 60.0, subject: Some("alice".into()), payload: EventPayload::Death { cause: "ghast fireball".into() } });

    let scenario = Scenario { name: "nether_disaster".into(), players: players(&["alice", "bob"]), events };
    let trace = ScenarioRunner::default().run(&scenario);
    assert_eq!(trace.deaths, 1);
    assert!(trace.final_phase >= Phase::Rising);
}

#[test]
fn chaos_test_reaches_apocalypse_and_stays_there() {
    let events: Vec<ScenarioEvent> = (0..40)
        .map(|i| ScenarioEvent {
            at_secs: i as f64,
            subject: Some("alice".into()),
            payload: EventPayload::Damage { amount: 10.0, cause: "relentless mobs".into() },
        })
        .collect();
    let scenario = Scenario { name: "chaos_test".into(), players: players(&["alice"]), events };
    let trace = ScenarioRunner::default().run(&scenario);
    assert_eq!(trace.final_phase, Phase::Apocalypse);
}

#[test]
fn chat_only_run_never_dispatches_state_changing_tools() {
    let events: Vec<ScenarioEvent> = (0..5)
        .map(|i| ScenarioEvent { at_secs: i as f64 * 2.0, subject: Some("alice".into()), payload: EventPayload::Chat { message: format!("msg {i}") } })
        .collect();
    let scenario = Scenario { name: "chat_only".into(), players: players(&["alice"]), events };
    let trace = ScenarioRunner::default().run(&scenario);
    assert_eq!(trace.deaths, 0);
    assert_eq!(trace.final_phase, Phase::Normal);
}

#[test]
fn protection_cap_rejects_calls_past_the_configured_limit() {
    let mut runner = ScenarioRunner::default();
    runner.config.max_mobs_per_run = 2;
    // Escalate hard enough that the scripted model proposes interventions repeatedly.
    let events: Vec<ScenarioEvent> = (0..5)
        .map(|i| ScenarioEvent { at_secs: i as f64 * 3.0, subject: Some("alice".into()), payload: EventPayload::Death { cause: "lava".into() } })
        .collect();
    let scenario = Scenario { name: "protection_cap".into(), players: players(&["alice"]), events };
    let trace = runner.run(&scenario);
    // Deaths are recorded even when every intervention is rejected.
    assert_eq!(trace.deaths, 5);
}

#[test]
fn model_outage_falls_back_to_silent_and_never_panics() {
    let mut runner = ScenarioRunner::default();
    runner.model = Arc::new(FailingModelProvider);
    runner.bridge = Arc::new(NullGameBridge);
    let scenario = Scenario {
        name: "model_outage".into(),
        players: players(&["alice"]),
        events: vec![
            ScenarioEvent { at_secs: 0.0, subject: Some("alice".into()), payload: EventPayload::Chat { message: "hello?".into() } },
            ScenarioEvent { at_secs: 5.0, subject: Some("alice".into()), payload: EventPayload::DragonKill },
        ],
    };
    let trace = runner.run(&scenario);
    assert_eq!(trace.total_tool_calls, 0);
    assert!(trace.victory);
}

#[test]
fn scripted_provider_is_reusable_across_runs() {
    let scenario = Scenario {
        name: "determinism_check".into(),
        players: players(&["alice"]),
        events: vec![ScenarioEvent { at_secs: 0.0, subject: Some("alice".into()), payload: EventPayload::DragonKill }],
    };
    let runner = ScenarioRunner { model: Arc::new(ScriptedModelProvider), ..ScenarioRunner::default() };
    let a = runner.run(&scenario);
    let b = runner.run(&scenario);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}
