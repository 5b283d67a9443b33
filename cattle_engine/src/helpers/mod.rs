mod settlement;

pub use settlement::{settle, weight_summary, WeightSummary};
