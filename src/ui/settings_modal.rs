/// Settings modal for one file or for the global defaults.
///
/// Save commits the buffer; Discard and the close button cancel it.
use iced::widget::{button, center, column, container, horizontal_space, mouse_area, opaque, pick_list, row, stack, text};
use iced::{Alignment, Color, Element, Length};

use crate::state::data::{ColorMode, Orientation, PageType};
use crate::state::editor::{EditorMode, SettingsEditor};
use crate::Message;

/// Draw `base` with the modal on top when the editor is open
pub fn overlay<'a>(base: Element<'a, Message>, editor: &SettingsEditor) -> Element<'a, Message> {
    let (Some(mode), Some(buffer)) = (editor.mode(), editor.buffer()) else {
        return base;
    };

    let title = match mode {
        EditorMode::Global => "Print Settings",
        EditorMode::File(_) => "File Configuration",
    };

    let orientation_button = |label: &'static str, value: Orientation| {
        let style = if buffer.orientation == value { button::primary } else { button::secondary };
        button(text(label))
            .on_press(Message::EditOrientation(value))
            .style(style)
            .width(Length::Fill)
    };

    let mut body = column![
        row![text(title).size(22), horizontal_space(), button(text("✕")).on_press(Message::CancelSettings)]
            .align_y(Alignment::Center),
        text("Print Mode").size(14),
        pick_list(ColorMode::ALL, Some(buffer.color), Message::EditColor).width(Length::Fill),
        text("Orientation").size(14),
        row![
            orientation_button("Portrait", Orientation::Portrait),
            orientation_button("Landscape", Orientation::Landscape),
        ]
        .spacing(12),
        text("Paper Size").size(14),
        pick_list(PageType::ALL, Some(buffer.page_type), Message::EditPageType).width(Length::Fill),
    ]
    .spacing(10);

    if let Some(quantity) = buffer.quantity {
        body = body.push(text("Copies").size(14)).push(
            row![
                button(text("−")).on_press(Message::DecrementQuantity),
                text(quantity.get().to_string()).size(22).width(Length::Fixed(48.0)),
                button(text("+")).on_press(Message::IncrementQuantity),
            ]
            .spacing(16)
            .align_y(Alignment::Center),
        );
    }

    body = body.push(
        row![
            horizontal_space(),
            button(text("Discard")).on_press(Message::CancelSettings).style(button::secondary),
            button(text("Save Changes")).on_press(Message::SaveSettings),
        ]
        .spacing(12),
    );

    let modal = container(body)
        .width(Length::Fixed(420.0))
        .padding(24)
        .style(container::rounded_box);

    stack![
        base,
        opaque(
            mouse_area(center(opaque(modal)).style(|_theme| container::Style {
                background: Some(Color { a: 0.6, ..Color::BLACK }.into()),
                ..container::Style::default()
            }))
            .on_press(Message::CancelSettings)
        )
    ]
    .into()
}
