/// The generic post page
///
/// Renders whichever page state it is handed: the error banner with the
/// raw payload, the empty notice, or the wrapped grid of cards, plus
/// the loading indicator, shown only while a request is in flight and
/// no error is on screen.

use std::collections::{HashMap, HashSet};

use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::feed::api::FetchError;
use crate::feed::post::Post;
use crate::state::likes::LikeStore;
use crate::Message;

use super::post_card::post_card;

pub fn gallery<'a>(
    posts: &'a [Post],
    error: Option<&'a FetchError>,
    loading: bool,
    likes: &'a LikeStore,
    expanded: &'a HashSet<String>,
    previews: &'a HashMap<String, image::Handle>,
) -> Element<'a, Message> {
    if let Some(error) = error {
        return container(text(format!("Couldn't load posts! Error: {}", error)))
            .width(Length::Fill)
            .padding(24)
            .center_x(Length::Fill)
            .into();
    }

    if !loading && posts.is_empty() {
        return container(text("No posts to display!"))
            .width(Length::Fill)
            .padding(24)
            .center_x(Length::Fill)
            .into();
    }

    let cards: Vec<Element<'a, Message>> = posts
        .iter()
        .map(|post| {
            post_card(
                post,
                likes.is_liked(&post.date),
                expanded.contains(&post.date),
                previews.get(&post.date),
            )
        })
        .collect();

    let grid = Wrap::with_elements(cards)
        .spacing(16.0)
        .line_spacing(16.0);

    let mut page = column![grid]
        .spacing(16)
        .align_x(Alignment::Center)
        .width(Length::Fill);

    if loading {
        page = page.push(text("Images are loading...").size(16));
    }

    page.into()
}
