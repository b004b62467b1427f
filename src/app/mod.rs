mod replay;
mod scenario;

pub use replay::{CommitRecord, FieldReport, Replay, ReplayReport};
pub use scenario::{FieldSpec, Scenario, Step};
