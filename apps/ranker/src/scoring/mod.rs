// Weight normalization and score aggregation.
// Everything here is pure apart from the evaluator calls made by the aggregator.

pub mod aggregator;
pub mod weights;

pub use aggregator::{combine, AggregatedScore, Aggregator, ScoreBreakdown};
pub use weights::{normalize, PartialWeights, WeightSet};
