//! Solremap - rewrite Solidity import paths using a remapping table.
//!
//! This library provides the core functionality for solremap, including:
//! - Parsing `remappings.txt` into an ordered remapping table
//! - Remapping import lines with first-match-wins precedence
//! - Preprocessing project sources into a cache directory
//! - Project configuration discovery
//!
//! # Example
//!
//! ```
//! use solremap::remap::{load_rules, transform_line};
//!
//! let table = load_rules("@oz/=lib/openzeppelin/\n").unwrap();
//! let line = transform_line("import \"@oz/token/ERC20.sol\";", &table);
//! assert_eq!(line, "import \"lib/openzeppelin/token/ERC20.sol\";");
//! ```

pub mod config;
pub mod error;
pub mod preprocess;
pub mod remap;

pub use error::{RemapError, Result};
