//! # Sorting
//!
//! Stable multi-key ordering over documents, plus special strategies
//! (distance) layered ahead of the regular keys. Null or missing values sort
//! last in both directions.

mod compare;
mod errors;
mod geo;
mod sorter;
mod special;

pub use compare::{compare_keys, compare_scalars, SortKey};
pub use errors::SortParseError;
pub use geo::{haversine_km, Coordinates, EARTH_RADIUS_KM};
pub use sorter::{
    compare_by_criteria, compare_key_lists, sort_by_criteria, sort_keys, SortCriteria, SortOrder,
};
pub use special::{sort_combined, RankKey, SpecialSort, DISTANCE_FIELD};
