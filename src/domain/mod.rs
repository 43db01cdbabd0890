//! Domain models and types for Adload.
//!
//! This module contains the record types for the campaign metrics schema,
//! the parsers for the compact input encodings (audience keys and the
//! embedded actions JSON), and the error hierarchy shared across the crate.

pub mod actions;
pub mod audience;
pub mod errors;
pub mod records;
pub mod result;

pub use actions::{parse_actions, ActionBreakdown};
pub use audience::{parse_audience_key, AudienceProfile};
pub use errors::LoadError;
pub use records::{
    Action, AdType, Audience, Campaign, DateDim, Impression, Source, Spend, Stat,
};
pub use result::Result;
