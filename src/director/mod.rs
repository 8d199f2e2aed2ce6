pub mod bridge;
pub mod config;
pub mod error;
pub mod event;
pub mod masks;
pub mod memory;
pub mod model;
pub mod pipeline;
pub mod scenario;
pub mod telemetry;
pub mod tools;
pub mod world;

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use bridge::{CorrelationIdGenerator, GameBridge};
use config::DirectorConfig;
use event::EventProcessor;
use masks::{MaskRegistry, MaskState, MaskVariant};
use memory::LongTermMemory;
use model::ModelProvider;
use pipeline::protect::RunCounters;
use pipeline::{run_pipeline, PipelineDeps, PipelineOutcome};
use tools::ToolRegistry;
use world::state::WorldState;

/// The live orchestrator: owns the event queue, mask state, tool registry,
/// and the world it reflects, and advances one event at a time. Mirrors the
/// corpus's world-plus-schedule-plus-observer shape, with the mutable ECS
/// swapped for the immutable `WorldState` the pipeline contract requires.
pub struct DirectorCore {
    pub config: DirectorConfig,
    processor: EventProcessor,
    registry: ToolRegistry,
    masks: MaskRegistry,
    mask_state: MaskState,
    mask_debt: HashMap<MaskVariant, f32>,
    run_counters: RunCounters,
    correlation_ids: CorrelationIdGenerator,
    long_term: Arc<dyn LongTermMemory>,
    model: Arc<dyn ModelProvider>,
    bridge: Arc<dyn GameBridge>,
    world: WorldState,
    recent_events: Vec<String>,
    rng: SmallRng,
}

impl DirectorCore {
    pub fn new(
        config: DirectorConfig,
        world: WorldState,
        long_term: Arc<dyn LongTermMemory>,
        model: Arc<dyn ModelProvider>,
        bridge: Arc<dyn GameBridge>,
        rng_seed: u64,
    ) -> Self {
        let mask_state = MaskState::initial(&config.mask);
        Self {
            processor: EventProcessor::new(&config),
            registry: ToolRegistry::with_defaults(),
            masks: MaskRegistry::with_defaults(),
            mask_state,
            mask_debt: HashMap::new(),
            run_counters: RunCounters::default(),
            correlation_ids: CorrelationIdGenerator::new(),
            long_term,
            model,
            bridge,
            world,
            recent_events: Vec::new(),
            rng: SmallRng::seed_from_u64(rng_seed),
            config,
        }
    }

    pub fn submit(&mut self, payload: event::EventPayload, subject: Option<String>, arrival_time: std::time::Duration) {
        self.processor.submit(payload, subject, arrival_time, &self.config);
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn queue_depth(&self) -> usize {
        self.processor.len()
    }

    /// Pops the next eligible event and runs it through the pipeline,
    /// updating mask state and world state in place. Returns `None` when
    /// the queue has nothing eligible right now.
    pub async fn process_next(&mut self) -> Option<PipelineOutcome> {
        let event = self.processor.next(&self.config)?;
        let description = memory::describe_event(&event);
        self.recent_events.push(description);
        if self.recent_events.len() > 200 {
            self.recent_events.remove(0);
        }

        let chat_buffer: Vec<String> = self.processor.chat_buffer().cloned().collect();
        let deps = PipelineDeps {
            registry: &self.registry,
            masks: &self.masks,
            long_term: self.long_term.as_ref(),
            model: self.model.as_ref(),
            bridge: self.bridge.as_ref(),
            correlation_ids: &self.correlation_ids,
        };

        let outcome = run_pipeline(
            event,
            &self.world,
            &self.mask_state,
            &mut self.mask_debt,
            &self.recent_events,
            &chat_buffer,
            &mut self.run_counters,
            &self.config,
            &deps,
            &mut self.rng,
        )
        .await;

        self.mask_state = outcome.mask_state.clone();
        self.world = outcome.world.clone();

        telemetry::log_pipeline_outcome(
            "event",
            outcome.mask_state.current,
            self.world.phase,
            outcome.terminal_state,
            outcome.tool_calls.len(),
            outcome.rejected_calls.len(),
        );
        if self.processor.overflow_count() > 0 {
            telemetry::log_queue_overflow(self.processor.overflow_count());
        }

        Some(outcome)
    }
}
