//! Response models

pub mod assessment;
pub mod model_info;

pub use assessment::*;
pub use model_info::*;
