//! Folding denormalized LEFT JOIN rows into nested detail objects.

pub mod blog;
pub mod flatten;
pub mod project;

pub use blog::{BlogDetail, BlogJoinRow};
pub use flatten::{flatten_many, flatten_one, FlattenError, Flattened, FoldRows, JoinRow, RelatedList};
pub use project::{ProjectDetail, ProjectJoinRow};
