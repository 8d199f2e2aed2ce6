//! Persona masks: a value-typed descriptor per variant, selected by a pure
//! softmax-over-affinity function. No trait objects, no hidden global debt
//! state — the selector takes debt and an rng explicitly and hands back a
//! new `MaskState` plus the updated debt table.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::director::config::MaskConfig;
use crate::director::event::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskVariant {
    Trickster,
    Prophet,
    Friend,
    ChaosBringer,
    Observer,
    Gambler,
}

impl MaskVariant {
    pub const ALL: [MaskVariant; 6] = [
        MaskVariant::Trickster,
        MaskVariant::Prophet,
        MaskVariant::Friend,
        MaskVariant::ChaosBringer,
        MaskVariant::Observer,
        MaskVariant::Gambler,
    ];
}

#[derive(Debug, Clone)]
pub struct MaskDescriptor {
    pub variant: MaskVariant,
    pub system_prompt_fragment: &'static str,
    affinity: HashMap<EventKind, f32>,
}

impl MaskDescriptor {
    fn new(variant: MaskVariant, system_prompt_fragment: &'static str, weights: &[(EventKind, f32)]) -> Self {
        Self { variant, system_prompt_fragment, affinity: weights.iter().copied().collect() }
    }

    fn affinity_for(&self, kind: EventKind) -> f32 {
        self.affinity.get(&kind).copied().unwrap_or(0.1)
    }
}

/// The fixed table of mask descriptors. Affinity coefficients are left as
/// configuration-free constants (spec §9 open question: resolved as static
/// data rather than config, since they describe persona identity rather
/// than a deployment-tunable knob).
pub struct MaskRegistry {
    descriptors: HashMap<MaskVariant, MaskDescriptor>,
}

impl MaskRegistry {
    pub fn with_defaults() -> Self {
        use EventKind::*;
        let table = [
            MaskDescriptor::new(
                MaskVariant::Trickster,
                "You are the Trickster: mischievous, fond of complications, never cruel without a punchline.",
                &[(Damage, 0.6), (MobKill, 0.7), (Inventory, 0.5), (Chat, 0.4)],
            ),
            MaskDescriptor::new(
                MaskVariant::Prophet,
                "You are the Prophet: speak in omens, foreshadow the run's shape, favor milestones.",
                &[(Advancement, 0.9), (Structure, 0.8), (Dimension, 0.6)],
            ),
            MaskDescriptor::new(
                MaskVariant::Friend,
                "You are the Friend: warm, protective in tone, quick to reassure after a close call.",
                &[(Death, 0.8), (Health, 0.9), (Chat, 0.7)],
            ),
            MaskDescriptor::new(
                MaskVariant::ChaosBringer,
                "You are the Chaos Bringer: escalate, delight in pressure, push the run toward its edge.",
                &[(Damage, 0.8), (DragonKill, 0.9), (Death, 0.6)],
            ),
            MaskDescriptor::new(
                MaskVariant::Observer,
                "You are the Observer: dry, clinical, narrates what happened without embellishment.",
                &[(MobKill, 0.5), (Inventory, 0.6), (Dimension, 0.5)],
            ),
            MaskDescriptor::new(
                MaskVariant::Gambler,
                "You are the Gambler: frames every moment as a wager, keeps score out loud.",
                &[(Damage, 0.5), (Advancement, 0.5), (DragonKill, 0.7)],
            ),
        ];
        Self { descriptors: table.into_iter().map(|d| (d.variant, d)).collect() }
    }

    pub fn descriptor(&self, variant: MaskVariant) -> &MaskDescriptor {
        self.descriptors.get(&variant).expect("all variants are registered")
    }

    pub fn affinity(&self, variant: MaskVariant, kind: EventKind) -> f32 {
        self.descriptor(variant).affinity_for(kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskState {
    pub current: MaskVariant,
    pub stability: f32,
    pub ticks_since_switch: u64,
}

impl MaskState {
    pub fn initial(config: &MaskConfig) -> Self {
        Self { current: MaskVariant::Observer, stability: config.stability, ticks_since_switch: 0 }
    }
}

fn softmax_sample(scores: &[(MaskVariant, f32)], rng: &mut impl Rng) -> MaskVariant {
    let max = scores.iter().map(|(_, s)| *s).fold(f32::MIN, f32::max);
    let exps: Vec<(MaskVariant, f32)> = scores.iter().map(|(v, s)| (*v, (s - max).exp())).collect();
    let total: f32 = exps.iter().map(|(_, e)| e).sum();
    let mut roll = rng.r#gen::<f32>() * total;
    for (variant, weight) in &exps {
        roll -= weight;
        if roll <= 0.0 {
            return *variant;
        }
    }
    exps.last().map(|(v, _)| *v).unwrap_or(MaskVariant::Observer)
}

/// Advances the mask state for one event. With probability `stability` the
/// current mask is retained and its stability decays linearly, floored at
/// `min_stability`. Otherwise a new mask is resampled via softmax over
/// affinity-plus-debt, and stability resets to the configured initial value.
pub fn select_mask(
    state: &MaskState,
    event: &Event,
    registry: &MaskRegistry,
    debt: &mut HashMap<MaskVariant, f32>,
    config: &MaskConfig,
    rng: &mut impl Rng,
) -> MaskState {
    let roll: f32 = rng.r#gen();
    let next = if roll < state.stability {
        MaskState {
            current: state.current,
            stability: (state.stability - config.stability_decay).max(config.min_stability),
            ticks_since_switch: state.ticks_since_switch + 1,
        }
    } else {
        let scores: Vec<(MaskVariant, f32)> = MaskVariant::ALL
            .iter()
            .map(|&variant| {
                let affinity = registry.affinity(variant, event.kind());
                let owed = debt.get(&variant).copied().unwrap_or(0.0);
                (variant, affinity + config.debt_weight * owed)
            })
            .collect();
        let chosen = softmax_sample(&scores, rng);
        MaskState { current: chosen, stability: config.stability, ticks_since_switch: 0 }
    };
    update_debt(debt, next.current, config);
    next
}

/// Masks that go unpicked accrue debt, raising their future selection odds;
/// the chosen mask's debt decays back toward zero. Keeps every variant
/// reachable over a long run instead of a few dominant masks crowding the
/// rest out.
fn update_debt(debt: &mut HashMap<MaskVariant, f32>, chosen: MaskVariant, config: &MaskConfig) {
    for variant in MaskVariant::ALL {
        let entry = debt.entry(variant).or_insert(0.0);
        if variant == chosen {
            *entry *= config.debt_decay;
        } else {
            *entry += config.debt_growth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn chat_event() -> Event {
        Event {
            subject: None,
            payload: crate::director::event::EventPayload::Chat { message: "hi".into() },
            arrival_time: Duration::ZERO,
        }
    }

    #[test]
    fn high_stability_usually_retains_mask() {
        let config = MaskConfig { stability: 1.0, ..MaskConfig::default() };
        let registry = MaskRegistry::with_defaults();
        let mut debt = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let state = MaskState::initial(&config);
        let next = select_mask(&state, &chat_event(), &registry, &mut debt, &config, &mut rng);
        assert_eq!(next.current, state.current);
    }

    #[test]
    fn unpicked_masks_accrue_debt() {
        let config = MaskConfig::default();
        let mut debt = HashMap::new();
        update_debt(&mut debt, MaskVariant::Observer, &config);
        assert!(debt[&MaskVariant::Trickster] > 0.0);
        assert_eq!(debt[&MaskVariant::Observer], 0.0);
    }
}
