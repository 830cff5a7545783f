pub mod metric;
pub mod principle;
pub mod scenario;
