pub mod pool;
pub mod suite;

pub use pool::WorkerPool;
pub use suite::{build_suite, SuiteEntry};
