pub mod snapshot;

pub use snapshot::ClusterSnapshot;
