pub mod data_point;
pub mod error;
pub mod number;

pub use data_point::{MergedRow, PricePoint, TvlPoint};
pub use error::ParseError;
pub use number::LooseNumber;
