//! MASK: advances the persona mask state for this event.

use std::collections::HashMap;

use rand::Rng;

use crate::director::config::MaskConfig;
use crate::director::event::Event;
use crate::director::masks::{select_mask, MaskRegistry, MaskState, MaskVariant};

pub fn pick_mask(
    state: &MaskState,
    event: &Event,
    registry: &MaskRegistry,
    debt: &mut HashMap<MaskVariant, f32>,
    config: &MaskConfig,
    rng: &mut impl Rng,
) -> MaskState {
    select_mask(state, event, registry, debt, config, rng)
}
