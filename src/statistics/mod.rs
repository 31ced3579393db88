/// Sequence statistics

pub mod sequence;

pub use sequence::SequenceStatistics;
