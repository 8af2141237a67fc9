// Collection pipeline: query -> validate -> classify -> group -> aggregate

pub mod chart;
pub mod classifier;
pub mod collector;
pub mod diagnostics;
pub mod grouping;
pub mod host;
pub mod names;
pub mod stats;
pub mod validator;

pub use classifier::classify;
pub use collector::{Collector, build_record};
pub use diagnostics::{DiagnosticEvent, Diagnostics};
pub use host::{HostAccumulator, HostAggregator, reconcile_disk};
pub use validator::{
    ValidationError, validate_labels, validate_metric_value, validate_record_completeness,
};
