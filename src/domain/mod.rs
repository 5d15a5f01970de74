//! Domain layer: grade and student trees
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod directory;
pub mod error;
pub mod grades;
pub mod record;
pub mod render;

pub use directory::{DirectoryNode, StudentDirectory};
pub use error::DomainError;
pub use grades::{Grade, GradeMultiset};
pub use record::{parse_grade, StudentRecord};
pub use render::TreeRender;
