//! Hierarchical doc comment tags.
//!
//! Parses `/** ... */` doc comments into a [`TagTree`], where a tag key
//! such as `foo-barQux-corge` places the value `corge` in the group
//! `barQux` inside the group `foo`.
//!
//! ```
//! use hierardoc::TagTree;
//!
//! let tags = TagTree::parse("/** @phpstan-var string $string */").unwrap();
//! let phpstan = tags.group("phpstan").unwrap().unwrap();
//! assert_eq!(phpstan.value("var").unwrap(), Some("string $string"));
//! assert_eq!(tags.lookup("phpstan-var"), Some("string $string"));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{parse, DomainError, DomainResult, Tag, TagTree};
