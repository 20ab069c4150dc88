/// State management module
///
/// This module handles all persisted application state:
/// - The SQLite settings store and its persistence seam (store.rs)
/// - The like mapping (likes.rs)

pub mod likes;
pub mod store;
