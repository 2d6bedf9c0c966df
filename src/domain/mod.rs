//! Domain layer: tag tree and doc comment parser
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod parser;
pub mod tags;

pub use error::{DomainError, DomainResult};
pub use parser::{parse, parse_tag, tags, Tag, GROUP_DELIMITER};
pub use tags::TagTree;
