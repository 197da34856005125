// Execution module - lifecycle events, per-unit context and aggregation

pub mod aggregator;
pub mod bus;
pub mod context;
pub mod events;
pub mod replay;

pub use aggregator::{AggregatorOptions, EventAggregator, RunState};
pub use bus::EventBus;
pub use context::{RequestSpec, ScenarioContext};
pub use events::{Envelope, EventRecord};
pub use replay::{
    ReplayPlan, ReplayStage, UnitEvents, load_event_log, merge_event_logs, parse_event_log, replay,
};
