//! # Domain Layer
//!
//! Pure domain logic for the Exposure Store.
//!
//! ## Modules
//!
//! - `entities` - Exposure, its storage form, and SequencePosition
//! - `criteria` - IterateCriteria and the criteria evaluator
//! - `cursor` - Cursor codec for resume tokens
//! - `value_objects` - Configuration and key layout
//! - `validation` - Record validation for insert batches
//! - `errors` - Domain error types

pub mod criteria;
pub mod cursor;
pub mod entities;
pub mod errors;
pub mod validation;
pub mod value_objects;
