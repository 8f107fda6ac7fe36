mod dump;
mod reset;

pub use dump::{DumpParameters, ParametersSnapshot};
pub use reset::{ResetParameters, ResetParametersError};
