pub mod convert;
pub mod plan;
pub mod schedule;
pub mod selection;
