//! Skip-hire listings: the data model and the HTTP source that produces it.

pub mod macros;
pub mod skip;
pub mod source;

pub use skip::{ImageUrl, SizeLabel, SkipId, SkipOption, yard_value};
pub use source::{Area, FetchError, HttpSkipSource, Location, Normalizer, Postcode, SkipSource};
