mod find_result;
mod misc;

pub use find_result::*;
pub use misc::*;
