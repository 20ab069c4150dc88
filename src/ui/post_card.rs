/// The card for a single post
///
/// Header, preview image, like/share actions and the collapsible
/// explanation. All interaction state (like flag, expanded flag) is
/// owned by the page; the card only renders it and emits messages.

use iced::widget::{button, column, container, horizontal_rule, image, row, text};
use iced::{Alignment, ContentFit, Element, Length};

use crate::feed::post::Post;
use crate::Message;

/// Fixed card width in the wrapped gallery grid.
const CARD_WIDTH: f32 = 360.0;
/// Height reserved for the preview image.
const IMAGE_HEIGHT: f32 = 240.0;

/// Build the card for one post.
pub fn post_card<'a>(
    post: &'a Post,
    liked: bool,
    expanded: bool,
    preview: Option<&image::Handle>,
) -> Element<'a, Message> {
    let header = column![
        text(format!("{}: {}", post.date, post.title)).size(18),
        text(post.attribution()).size(13),
    ]
    .spacing(2);

    let picture: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(IMAGE_HEIGHT)
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("Loading image...").size(14))
            .width(Length::Fill)
            .height(IMAGE_HEIGHT)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
    };

    let like_label = if liked { "♥" } else { "♡" };
    let mut actions = row![button(text(like_label).size(22))
        .style(button::text)
        .on_press(Message::LikeToggled(post.date.clone(), !liked))]
    .spacing(8)
    .align_y(Alignment::Center);

    if let Some(link) = post.share_link() {
        actions = actions.push(
            button(text("⇪").size(22))
                .style(button::text)
                .on_press(Message::ShareRequested(link.to_string())),
        );
    }

    let caption: Element<'a, Message> = if expanded {
        column![
            text(&post.explanation).size(14),
            button(text("Read less").size(14))
                .style(button::text)
                .on_press(Message::ExpandToggled(post.date.clone(), false)),
        ]
        .spacing(4)
        .into()
    } else {
        column![
            text(format!("{}... ", post.preview())).size(14),
            button(text("Read more").size(14))
                .style(button::text)
                .on_press(Message::ExpandToggled(post.date.clone(), true)),
        ]
        .spacing(4)
        .into()
    };

    container(
        column![header, picture, actions, horizontal_rule(1), caption]
            .spacing(8)
            .padding(12),
    )
    .width(CARD_WIDTH)
    .style(container::rounded_box)
    .into()
}
