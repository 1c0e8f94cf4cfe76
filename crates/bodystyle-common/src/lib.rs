pub mod error;
pub mod range;

pub use error::{Error, Result};
pub use range::{BodyRange, BodyRangeList, Style};
