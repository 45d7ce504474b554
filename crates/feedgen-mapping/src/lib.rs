//! Product → feed item mapping for each destination.
//!
//! Helpers in this crate are pure functions of their inputs; the two
//! destination mappers compose them and differ only in the fields and
//! limits their platforms use.

pub mod attributes;
pub mod category;
pub mod common;
pub mod error;
pub mod filters;
pub mod google;
pub mod images;
pub mod labels;
pub mod mapper;
pub mod meta;
pub mod pricing;
pub mod reviews;
pub mod tags;
pub mod text;

#[cfg(test)]
mod test_support;

pub use error::MappingError;
pub use filters::DropReason;
pub use google::GoogleMapper;
pub use labels::split_collection_labels;
pub use mapper::{map_product, mapper_for, FeedMapper, MapperContext, ProductMapping};
pub use meta::MetaMapper;
