//! Aggregation state and the pipeline that feeds it.

pub mod app;
pub mod phase;
pub mod state;
pub mod store;

pub use app::App;
pub use phase::Phase;
pub use state::{AggregationState, Preferences, EMPTY_STATE_MESSAGE};
pub use store::AggregationStore;
