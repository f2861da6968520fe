mod chat;
mod draft;
mod organization;
mod project;
mod task;

pub mod due_date;

pub use chat::*;
pub use draft::*;
pub use organization::*;
pub use project::*;
pub use task::*;
