pub mod blog;
pub mod content;
pub mod image;
pub mod profile;
pub mod project;
pub mod user;

pub use blog::{Blog, BlogFields, ReadingTime};
pub use content::{Author, Statistic, Technology, Testimonial, Topic};
pub use image::{ContentImage, NewContentImage, OwnerKind};
pub use profile::{About, Experience};
pub use project::{Project, ProjectFields};
pub use user::User;
