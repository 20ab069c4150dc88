/// UI building blocks shared by every page
///
/// - One post card (post_card.rs)
/// - The generic post page around a list of cards (gallery.rs)

pub mod gallery;
pub mod post_card;
