//! # Formats Module
//!
//! Wire formats for blueprint documents.
//!
//! - `exchange`: the versioned, compressed copy/paste string
//!
//! Only pure transformations live here. Reading and writing files is done
//! by the app layer.

mod exchange;

pub use exchange::{decode, encode};
