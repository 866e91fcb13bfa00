/// Paged list of added files
use iced::widget::{button, column, container, horizontal_space, row, text, Column};
use iced::{Alignment, Element, Length};

use crate::files::mime::FileKind;
use crate::state::controller::Controller;
use crate::Message;

pub fn view(controller: &Controller) -> Element<'_, Message> {
    if controller.is_empty() {
        return text("No files yet. Drop files here or use Add Files.").size(14).into();
    }

    let selected = controller.selected_id();

    let rows = controller.visible_entries().map(|(_, entry)| {
        let kind = FileKind::from_mime(&entry.payload.mime);
        let marker = if selected == Some(entry.id) { "▶" } else { " " };

        let label = row![
            text(marker).width(Length::Fixed(16.0)),
            container(text(kind.label()).size(12)).width(Length::Fixed(44.0)),
            column![
                text(entry.name()).size(16),
                text(entry.quantity.label()).size(12),
            ]
            .spacing(2),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        row![
            button(label)
                .on_press(Message::Select(entry.id))
                .style(button::text)
                .width(Length::Fill),
            button(text("⚙")).on_press(Message::OpenFileSettings(entry.id)),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    });

    let mut list = Column::with_children(rows).spacing(8);

    let total = controller.len();
    let pages = controller.pagination();
    if pages.page_count(total) > 1 {
        list = list.push(
            row![
                horizontal_space(),
                text(format!("{} / {}", pages.current_page() + 1, pages.page_count(total))).size(12),
                button(text("‹")).on_press_maybe(pages.has_previous().then_some(Message::PreviousPage)),
                button(text("›")).on_press_maybe(pages.has_next(total).then_some(Message::NextPage)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        );
    }

    list.into()
}
