//! Read-side projections of the repository plus form validation.
//!
//! Views never own tasks or projects; they borrow slices of the repository
//! and hand mutation intents back to it.

mod action_items;
mod people;
mod projects;
mod sort;

pub use action_items::*;
pub use people::*;
pub use projects::*;
pub use sort::*;

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
