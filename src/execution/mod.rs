// Decision, dispatch and scheduling of trading ticks
pub mod dispatcher;
pub mod pipeline;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{DispatchOutcome, ExecutionAction, ExecutionDecision, OrderDispatcher};
pub use pipeline::TradingPipeline;
pub use scheduler::Scheduler;
