pub mod executor;
pub mod result;

pub use executor::Executor;
pub use result::{CommandResult, ExecError};
