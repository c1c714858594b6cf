//! Index mapping metadata consumed by aggregation resolution.
//!
//! Types in `model` describe *what an index looks like*: its fields and, at
//! most, one parent/child join declaration. Resolution reads them; nothing in
//! this module knows about aggregations.
pub mod field;
pub mod index;
pub mod join;
