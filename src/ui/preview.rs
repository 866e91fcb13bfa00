/// Preview panel
///
/// Shows the selected file inline, its converted preview, a spinner while
/// converting, or a failure notice. Landscape and black & white settings
/// are rendered as a rotated / grayscale copy of the bitmap; the file's own
/// bytes and the cached URL are never modified.

use iced::widget::{button, column, container, horizontal_space, image, row, text};
use iced::{Alignment, ContentFit, Element, Length};
use std::io::Cursor;
use std::sync::Arc;

use crate::files::mime;
use crate::state::controller::Controller;
use crate::state::data::EntryId;
use crate::state::preview::{DisplayTransform, PreviewState};
use crate::Message;

/// Where the displayed bitmap came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplaySource {
    Inline(EntryId),
    Converted(String),
}

/// Identifies exactly what a rendered bitmap shows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayKey {
    pub source: DisplaySource,
    pub transform: DisplayTransform,
}

/// A bitmap ready for the image widget
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub key: DisplayKey,
    pub handle: image::Handle,
}

/// Rotate and/or desaturate an encoded image, returning PNG bytes
pub fn apply_transform(bytes: &[u8], transform: DisplayTransform) -> Result<Vec<u8>, ::image::ImageError> {
    let mut img = ::image::load_from_memory(bytes)?;
    if transform.grayscale {
        img = img.grayscale();
    }
    if transform.rotate {
        img = img.rotate90();
    }

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ::image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Run `apply_transform` on the blocking pool
pub async fn render_display(bytes: Arc<[u8]>, transform: DisplayTransform) -> Result<Vec<u8>, String> {
    tokio::task::spawn_blocking(move || apply_transform(&bytes, transform).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// "12.3 KB"
pub fn size_label(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// What the shell knows about the converted preview download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    Ready,
    Failed,
}

/// Default file name when saving a converted preview
pub fn converted_file_name(original: &str) -> String {
    let stem = original.split('.').next().unwrap_or(original);
    format!("{}_converted.png", stem)
}

pub fn view<'a>(
    controller: &'a Controller,
    display: Option<&'a DisplayImage>,
    download: DownloadStatus,
) -> Element<'a, Message> {
    let selected = controller.selected_entry();

    let title = selected.map(|e| e.name().to_string()).unwrap_or_else(|| "No File Selected".to_string());
    let mut heading = column![text(title).size(20)].spacing(4);
    if let Some(entry) = selected {
        heading = heading.push(
            text(format!("{} • {}", entry.payload.mime, size_label(entry.payload.size()))).size(12),
        );
    }

    let mut actions = row![].spacing(8);
    if download == DownloadStatus::Ready {
        actions = actions.push(button(text("Download")).on_press(Message::SaveConvertedPreview));
    }
    if let Some(entry) = selected {
        actions = actions.push(button(text("Settings")).on_press(Message::OpenFileSettings(entry.id)));
    }

    let header = row![heading, horizontal_space(), actions].align_y(Alignment::Center);

    let body: Element<Message> = match (selected, controller.preview_state()) {
        (None, _) | (_, PreviewState::Empty) => text("Add files to see a preview").into(),
        (_, PreviewState::Loading) => column![
            text("Converting file...").size(18),
            text("Please wait while we process your file.").size(12),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        (_, PreviewState::Failed) => column![
            text("Conversion failed").size(18),
            text("We couldn't convert this file format. Please try another file.").size(12),
            button(text("Retry")).on_press(Message::RetryPreview),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        (Some(entry), PreviewState::Inline) if !mime::can_display_inline(&entry.payload.mime) => column![
            text("Preview not available").size(18),
            text(format!("{} images cannot be shown here; the file will still be printed.", entry.payload.mime))
                .size(12),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        (_, PreviewState::Converted { .. }) if display.is_none() && download == DownloadStatus::Failed => column![
            text("Could not load the converted preview").size(18),
            text("The file was converted but the preview image could not be downloaded.").size(12),
            button(text("Retry")).on_press(Message::RetryDownload),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        (_, PreviewState::Inline) | (_, PreviewState::Converted { .. }) => match display {
            Some(display) => image(display.handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("Rendering preview...").into(),
        },
    };

    column![
        header,
        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .padding(16),
    ]
    .spacing(12)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{ImageFormat, Rgb, RgbImage};

    fn png_2x1() -> Vec<u8> {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let out = apply_transform(&png_2x1(), DisplayTransform { rotate: true, grayscale: false }).unwrap();
        let img = ::image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (1, 2));
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let source = png_2x1();
        let out = apply_transform(&source, DisplayTransform { rotate: false, grayscale: true }).unwrap();
        let img = ::image::load_from_memory(&out).unwrap().to_rgb8();
        let px = img.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);

        // The source bytes are untouched
        assert_eq!(source, png_2x1());
    }

    #[test]
    fn test_undecodable_bytes_error() {
        assert!(apply_transform(b"not an image", DisplayTransform { rotate: true, grayscale: true }).is_err());
    }

    #[tokio::test]
    async fn test_render_display_off_thread() {
        let bytes: Arc<[u8]> = Arc::from(png_2x1());
        let out = render_display(bytes, DisplayTransform { rotate: true, grayscale: true }).await.unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(size_label(1536), "1.5 KB");
        assert_eq!(converted_file_name("report.final.pdf"), "report_converted.png");
        assert_eq!(converted_file_name("scan"), "scan_converted.png");
    }
}
