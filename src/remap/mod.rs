//! Import remapping for solremap.
//!
//! This module handles:
//! - Parsing `from=to` remapping rules into an ordered table
//! - Recognizing import lines and applying the first matching rule

pub mod table;
pub mod transform;

pub use table::{RemappingRule, RemappingTable, load_rules, load_rules_file};
pub use transform::{is_import_line, transform_line};
