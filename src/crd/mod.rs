//! Custom Resource Definitions (CRDs) for batchjob-operator.
//!
//! - `BatchJob`: batch workload with lifecycle policies and volume mounts

mod batch_job;

pub use batch_job::*;
