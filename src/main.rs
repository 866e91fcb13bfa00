use iced::widget::{button, column, container, horizontal_space, row, text};
use iced::{event, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod files;
mod service;
mod state;
mod ui;

use config::AppConfig;
use error::ServiceError;
use files::loader::{self, LoadQueue, LoadResult};
use service::ServiceClient;
use state::cache::ConvertedCache;
use state::controller::Controller;
use state::data::{ColorMode, EntryId, Orientation, PageType};
use state::preview::{ConversionOutcome, ConversionRequest, PreviewState};
use ui::preview::{DisplayImage, DisplayKey, DisplaySource, DownloadStatus};

/// A downloaded converted preview
#[derive(Debug, Clone)]
struct Artifact {
    url: String,
    bytes: Arc<[u8]>,
}

/// Main application state
struct PrintDesk {
    /// Files, selection, editor and preview state
    controller: Controller,
    /// Conversion / upload service
    client: ServiceClient,
    config: AppConfig,
    /// Bitmap currently shown in the preview panel
    display: Option<DisplayImage>,
    /// Bitmap being rendered in the background
    pending_display: Option<DisplayKey>,
    /// Converted preview downloaded for the current selection
    artifact: Option<Artifact>,
    /// URL being downloaded
    pending_artifact: Option<String>,
    /// URL whose download last failed; not fetched again until retried
    failed_download: Option<String>,
    /// Background file loads, released in the order they were started
    loads: LoadQueue,
    /// Status line shown at the bottom
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    AddFiles,
    AddFolder,
    FileDropped(PathBuf),
    FilesLoaded(u64, Vec<LoadResult>),
    Select(EntryId),
    NextPage,
    PreviousPage,
    OpenFileSettings(EntryId),
    OpenGlobalSettings,
    EditColor(ColorMode),
    EditPageType(PageType),
    EditOrientation(Orientation),
    IncrementQuantity,
    DecrementQuantity,
    SaveSettings,
    CancelSettings,
    ConversionFinished(ConversionOutcome),
    RetryPreview,
    ArtifactFetched(String, Result<Arc<[u8]>, ServiceError>),
    RetryDownload,
    DisplayRendered(DisplayKey, Result<Vec<u8>, String>),
    SaveConvertedPreview,
    Submit,
    SubmitFinished(Result<(), ServiceError>),
}

impl PrintDesk {
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();

        let cache = ConvertedCache::open_default().unwrap_or_else(|e| {
            tracing::warn!("Preview cache unavailable, using in-memory cache: {}", e);
            ConvertedCache::open_in_memory().expect("in-memory SQLite is always available")
        });

        // An unparsable configured endpoint falls back to the built-in ones
        let client = ServiceClient::new(&config).unwrap_or_else(|e| {
            tracing::error!("Invalid service configuration ({}), using defaults", e);
            ServiceClient::new(&AppConfig::default()).expect("default endpoints are valid")
        });

        tracing::info!("Print Desk ready (page size {})", config.page_size);

        (PrintDesk::from_parts(cache, client, config), Task::none())
    }

    fn from_parts(cache: ConvertedCache, client: ServiceClient, config: AppConfig) -> Self {
        PrintDesk {
            controller: Controller::new(cache, config.page_size),
            client,
            config,
            display: None,
            pending_display: None,
            artifact: None,
            pending_artifact: None,
            failed_download: None,
            loads: LoadQueue::default(),
            status: "Ready. Drop files or click Add Files.".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddFiles => {
                let extensions = files::mime::accepted_extensions();
                let picked = FileDialog::new()
                    .set_title("Add Files")
                    .add_filter("Documents and images", &extensions)
                    .pick_files();

                match picked {
                    Some(paths) if !paths.is_empty() => self.load(paths),
                    _ => Task::none(),
                }
            }
            Message::AddFolder => {
                let Some(folder) = FileDialog::new().set_title("Add Folder").pick_folder() else {
                    return Task::none();
                };
                self.status = format!("Importing from {}...", folder.display());
                let ticket = self.loads.start();
                Task::perform(loader::load_folder(folder, self.config.max_file_bytes), move |results| {
                    Message::FilesLoaded(ticket, results)
                })
            }
            Message::FileDropped(path) => self.load(vec![path]),
            Message::FilesLoaded(ticket, results) => {
                let released = self.loads.finish(ticket, results);
                if released.is_empty() {
                    if self.loads.in_flight() == 0 {
                        self.status = "No files to add.".to_string();
                    }
                    return Task::none();
                }
                self.add_loaded(released)
            }
            Message::Select(id) => {
                let request = self.controller.select(id);
                Task::batch([self.convert(request), self.refresh_display()])
            }
            Message::NextPage => {
                self.controller.next_page();
                Task::none()
            }
            Message::PreviousPage => {
                self.controller.previous_page();
                Task::none()
            }
            Message::OpenFileSettings(id) => {
                self.controller.open_file_settings(id);
                Task::none()
            }
            Message::OpenGlobalSettings => {
                self.controller.open_global_settings();
                Task::none()
            }
            Message::EditColor(color) => {
                self.controller.editor_mut().set_color(color);
                Task::none()
            }
            Message::EditPageType(page_type) => {
                self.controller.editor_mut().set_page_type(page_type);
                Task::none()
            }
            Message::EditOrientation(orientation) => {
                self.controller.editor_mut().set_orientation(orientation);
                Task::none()
            }
            Message::IncrementQuantity => {
                self.controller.editor_mut().increment_quantity();
                Task::none()
            }
            Message::DecrementQuantity => {
                self.controller.editor_mut().decrement_quantity();
                Task::none()
            }
            Message::SaveSettings => {
                if let Err(e) = self.controller.save_settings() {
                    tracing::warn!("Settings not saved: {}", e);
                    self.status = format!("Settings not saved: {}", e);
                }
                self.refresh_display()
            }
            Message::CancelSettings => {
                self.controller.cancel_settings();
                Task::none()
            }
            Message::ConversionFinished(outcome) => {
                if self.controller.conversion_finished(outcome) {
                    self.refresh_display()
                } else {
                    Task::none()
                }
            }
            Message::RetryPreview => {
                let request = self.controller.retry_preview();
                self.convert(request)
            }
            Message::ArtifactFetched(url, result) => {
                if self.pending_artifact.as_deref() == Some(url.as_str()) {
                    self.pending_artifact = None;
                }
                // Downloads for a preview no longer on screen are dropped
                if self.converted_url() != Some(url.as_str()) {
                    tracing::debug!("Discarding download for {}", url);
                    return Task::none();
                }
                match result {
                    Ok(bytes) => {
                        self.failed_download = None;
                        self.artifact = Some(Artifact { url, bytes });
                        self.refresh_display()
                    }
                    Err(e) => {
                        tracing::warn!("Could not download converted preview {}: {}", url, e);
                        self.status = format!("Could not download converted preview: {}", e);
                        self.failed_download = Some(url);
                        self.display = None;
                        Task::none()
                    }
                }
            }
            Message::RetryDownload => {
                self.failed_download = None;
                self.refresh_display()
            }
            Message::DisplayRendered(key, result) => {
                if self.pending_display.as_ref() != Some(&key) {
                    return Task::none();
                }
                self.pending_display = None;

                let bytes = match result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        // Show the untransformed bitmap rather than nothing
                        tracing::warn!("Preview transform failed: {}", e);
                        match self.source_bytes(&key.source) {
                            Some(bytes) => bytes.to_vec(),
                            None => return Task::none(),
                        }
                    }
                };
                self.display = Some(DisplayImage {
                    key,
                    handle: iced::widget::image::Handle::from_bytes(bytes),
                });
                Task::none()
            }
            Message::SaveConvertedPreview => {
                self.save_converted_preview();
                Task::none()
            }
            Message::Submit => {
                let Some(batch) = self.controller.begin_submit() else {
                    return Task::none();
                };
                self.status = format!("Uploading {} file(s)...", batch.len());
                let client = self.client.clone();
                Task::perform(async move { client.submit(batch).await }, Message::SubmitFinished)
            }
            Message::SubmitFinished(result) => {
                let task = self.finish_submit(&result);
                match result {
                    Ok(()) => show_dialog(MessageLevel::Info, "Upload complete", "Files uploaded successfully!"),
                    Err(_) => show_dialog(MessageLevel::Error, "Upload failed", "Upload failed. Please try again."),
                }
                task
            }
        }
    }

    /// Read files in the background, then add them
    fn load(&mut self, paths: Vec<PathBuf>) -> Task<Message> {
        self.status = format!("Reading {} file(s)...", paths.len());
        let ticket = self.loads.start();
        Task::perform(loader::load_files(paths, self.config.max_file_bytes), move |results| {
            Message::FilesLoaded(ticket, results)
        })
    }

    /// Append released load results and report what was skipped
    fn add_loaded(&mut self, results: Vec<LoadResult>) -> Task<Message> {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for (path, result) in results {
            match result {
                Ok(file) => loaded.push(file),
                Err(e) => failed.push(format!("{} ({})", path.display(), e)),
            }
        }

        let added = loaded.len();
        let request = self.controller.add_files(loaded);

        self.status = if failed.is_empty() {
            format!("Added {} file(s). {}.", added, self.controller.item_count_label())
        } else {
            format!("Added {} file(s), skipped {}: {}", added, failed.len(), failed.join(", "))
        };

        Task::batch([self.convert(request), self.refresh_display()])
    }

    fn finish_submit(&mut self, result: &Result<(), ServiceError>) -> Task<Message> {
        self.controller.submit_finished(result);
        match result {
            Ok(()) => {
                self.status = "Files uploaded successfully!".to_string();
                self.artifact = None;
                self.failed_download = None;
            }
            Err(e) => self.status = format!("Upload failed: {}", e),
        }
        self.refresh_display()
    }

    /// Run a conversion request, if there is one
    fn convert(&self, request: Option<ConversionRequest>) -> Task<Message> {
        let Some(ConversionRequest { job, payload }) = request else {
            return Task::none();
        };
        let client = self.client.clone();
        Task::perform(
            async move {
                let result = client.convert(payload).await;
                job.finish(result)
            },
            Message::ConversionFinished,
        )
    }

    fn source_bytes(&self, source: &DisplaySource) -> Option<Arc<[u8]>> {
        match source {
            DisplaySource::Inline(id) => self.controller.entry(*id).map(|e| e.payload.bytes.clone()),
            DisplaySource::Converted(url) => self
                .artifact
                .as_ref()
                .filter(|a| &a.url == url)
                .map(|a| a.bytes.clone()),
        }
    }

    /// Bring the preview bitmap in line with the selection and its settings
    fn refresh_display(&mut self) -> Task<Message> {
        let (Some(entry), Some(transform)) = (self.controller.selected_entry(), self.controller.display_transform())
        else {
            self.display = None;
            self.pending_display = None;
            return Task::none();
        };

        let source = match self.controller.preview_state() {
            PreviewState::Inline if files::mime::can_display_inline(&entry.payload.mime) => {
                DisplaySource::Inline(entry.id)
            }
            PreviewState::Converted { url } if self.failed_download.as_ref() != Some(url) => {
                DisplaySource::Converted(url.clone())
            }
            _ => {
                self.display = None;
                self.pending_display = None;
                return Task::none();
            }
        };

        let key = DisplayKey { source, transform };
        if self.display.as_ref().map(|d| &d.key) == Some(&key) || self.pending_display.as_ref() == Some(&key) {
            return Task::none();
        }

        let Some(bytes) = self.source_bytes(&key.source) else {
            // Converted preview not downloaded yet
            let DisplaySource::Converted(url) = &key.source else {
                return Task::none();
            };
            if self.pending_artifact.as_ref() == Some(url) {
                return Task::none();
            }
            self.display = None;
            self.pending_artifact = Some(url.clone());
            let client = self.client.clone();
            let url = url.clone();
            return Task::perform(
                async move {
                    let result = client.fetch_artifact(url.clone()).await.map(Arc::<[u8]>::from);
                    (url, result)
                },
                |(url, result)| Message::ArtifactFetched(url, result),
            );
        };

        if key.transform.is_identity() {
            let handle = match &key.source {
                DisplaySource::Inline(id) => self.controller.entry(*id).map(|e| e.preview_handle.clone()),
                DisplaySource::Converted(_) => None,
            }
            .unwrap_or_else(|| iced::widget::image::Handle::from_bytes(bytes.to_vec()));
            self.pending_display = None;
            self.display = Some(DisplayImage { key, handle });
            return Task::none();
        }

        self.pending_display = Some(key.clone());
        Task::perform(ui::preview::render_display(bytes, key.transform), move |result| {
            Message::DisplayRendered(key.clone(), result)
        })
    }

    fn save_converted_preview(&mut self) {
        if self.download_status() != DownloadStatus::Ready {
            return;
        }
        let (Some(entry), Some(artifact)) = (self.controller.selected_entry(), self.artifact.as_ref()) else {
            return;
        };

        let Some(path) = FileDialog::new()
            .set_title("Save converted preview")
            .set_file_name(ui::preview::converted_file_name(entry.name()))
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, &artifact.bytes) {
            Ok(()) => self.status = format!("Saved {}", path.display()),
            Err(e) => {
                tracing::error!("Failed to save {}: {}", path.display(), e);
                self.status = format!("Failed to save {}: {}", path.display(), e);
            }
        }
    }

    /// URL of the converted preview on screen, if any
    fn converted_url(&self) -> Option<&str> {
        match self.controller.preview_state() {
            PreviewState::Converted { url } => Some(url),
            _ => None,
        }
    }

    fn download_status(&self) -> DownloadStatus {
        let Some(url) = self.converted_url() else {
            return DownloadStatus::Idle;
        };
        if self.artifact.as_ref().is_some_and(|a| a.url == url) {
            DownloadStatus::Ready
        } else if self.failed_download.as_deref() == Some(url) {
            DownloadStatus::Failed
        } else {
            DownloadStatus::Idle
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let left = column![
            text("Document Manager").size(32),
            text("Upload, manage, and preview documents").size(14),
            container(
                column![
                    text("Add Files").size(20),
                    text("Drag & drop files onto the window, or browse").size(12),
                    row![
                        button(text("Add Files")).on_press(Message::AddFiles),
                        button(text("Add Folder")).on_press(Message::AddFolder).style(button::secondary),
                    ]
                    .spacing(10),
                ]
                .spacing(8)
                .align_x(Alignment::Center),
            )
            .width(Length::Fill)
            .padding(24)
            .center_x(Length::Fill)
            .style(container::rounded_box),
            text("Uploaded Files").size(18),
            ui::file_list::view(&self.controller),
        ]
        .spacing(16)
        .width(Length::FillPortion(1));

        let submit_label = if self.controller.is_submitting() { "Processing..." } else { "Upload Documents" };
        let submit = button(text(submit_label)).padding(12).on_press_maybe(
            (!self.controller.is_empty() && !self.controller.is_submitting()).then_some(Message::Submit),
        );

        let right = column![
            row![
                text("Document Preview").size(18),
                horizontal_space(),
                text(self.controller.item_count_label()).size(12),
                button(text("Print Settings"))
                    .on_press(Message::OpenGlobalSettings)
                    .style(button::secondary),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            container(ui::preview::view(&self.controller, self.display.as_ref(), self.download_status()))
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(12)
                .style(container::rounded_box),
        ]
        .spacing(16)
        .width(Length::FillPortion(1));

        let content = column![
            row![left, right].spacing(24).height(Length::Fill),
            row![text(&self.status).size(14), horizontal_space(), submit].align_y(Alignment::Center),
        ]
        .spacing(16)
        .padding(24);

        ui::settings_modal::overlay(content.into(), self.controller.editor())
    }

    /// Window file drops
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn show_dialog(level: MessageLevel, title: &str, description: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("print_desk=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    iced::application("Print Desk", PrintDesk::update, PrintDesk::view)
        .subscription(PrintDesk::subscription)
        .theme(PrintDesk::theme)
        .centered()
        .run_with(PrintDesk::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::state::data::{sample_file, LoadedFile};

    const A_URL: &str = "https://h/a.png";
    const B_URL: &str = "https://h/b.png";

    fn pdf(name: &str) -> LoadedFile {
        sample_file(name, "application/pdf", name.as_bytes())
    }

    fn png_bytes() -> Arc<[u8]> {
        Arc::from(&b"\x89PNG not really"[..])
    }

    /// Desk whose preview cache already holds a converted URL for each file
    fn desk(cached: &[(&LoadedFile, &str)]) -> PrintDesk {
        let cache = ConvertedCache::open_in_memory().unwrap();
        for (file, url) in cached {
            cache.insert(&file.fingerprint, &file.payload.name, url).unwrap();
        }
        let config = AppConfig::default();
        let client = ServiceClient::new(&config).unwrap();
        PrintDesk::from_parts(cache, client, config)
    }

    fn loaded(files: Vec<LoadedFile>) -> Vec<LoadResult> {
        files
            .into_iter()
            .map(|f| (PathBuf::from(&f.payload.name), Ok(f)))
            .collect()
    }

    fn add(app: &mut PrintDesk, files: Vec<LoadedFile>) {
        let ticket = app.loads.start();
        let _ = app.update(Message::FilesLoaded(ticket, loaded(files)));
    }

    fn names(app: &PrintDesk) -> Vec<&str> {
        app.controller.entries().iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_drops_are_added_in_drop_order() {
        let mut app = desk(&[]);
        let big = app.loads.start();
        let small = app.loads.start();

        let _ = app.update(Message::FilesLoaded(small, loaded(vec![pdf("small.txt")])));
        assert!(app.controller.is_empty());

        let _ = app.update(Message::FilesLoaded(big, loaded(vec![pdf("big.pdf")])));
        assert_eq!(names(&app), vec!["big.pdf", "small.txt"]);
        assert_eq!(app.controller.selected_entry().unwrap().name(), "big.pdf");
    }

    #[test]
    fn test_mixed_load_results_add_good_files_and_report_bad_ones() {
        let mut app = desk(&[]);
        let ticket = app.loads.start();
        let results = vec![
            (PathBuf::from("a.pdf"), Ok(pdf("a.pdf"))),
            (
                PathBuf::from("tool.exe"),
                Err(LoadError::Unsupported { name: "tool.exe".to_string() }),
            ),
        ];
        let _ = app.update(Message::FilesLoaded(ticket, results));

        assert_eq!(names(&app), vec!["a.pdf"]);
        assert!(app.status.contains("skipped 1"));
        assert!(app.status.contains("tool.exe"));
    }

    #[test]
    fn test_cached_document_starts_its_download() {
        let a = pdf("a.pdf");
        let mut app = desk(&[(&a, A_URL)]);
        add(&mut app, vec![a]);

        assert_eq!(app.converted_url(), Some(A_URL));
        assert_eq!(app.pending_artifact.as_deref(), Some(A_URL));
        assert_eq!(app.download_status(), DownloadStatus::Idle);

        let _ = app.update(Message::ArtifactFetched(A_URL.to_string(), Ok(png_bytes())));
        assert_eq!(app.download_status(), DownloadStatus::Ready);
        assert!(app.display.is_some());
        assert!(app.pending_artifact.is_none());
    }

    #[test]
    fn test_late_download_for_previous_selection_is_dropped() {
        let a = pdf("a.pdf");
        let b = pdf("b.pdf");
        let mut app = desk(&[(&a, A_URL), (&b, B_URL)]);
        add(&mut app, vec![a, b]);

        let b_id = app.controller.entries()[1].id;
        let _ = app.update(Message::Select(b_id));
        assert_eq!(app.pending_artifact.as_deref(), Some(B_URL));

        let _ = app.update(Message::ArtifactFetched(B_URL.to_string(), Ok(png_bytes())));
        assert_eq!(app.download_status(), DownloadStatus::Ready);

        let status = app.status.clone();
        let _ = app.update(Message::ArtifactFetched(A_URL.to_string(), Ok(png_bytes())));
        let _ = app.update(Message::ArtifactFetched(
            A_URL.to_string(),
            Err(ServiceError::Status(500)),
        ));

        assert_eq!(app.download_status(), DownloadStatus::Ready);
        assert_eq!(app.artifact.as_ref().map(|a| a.url.as_str()), Some(B_URL));
        assert!(app.failed_download.is_none());
        assert_eq!(app.status, status);
    }

    #[test]
    fn test_failed_download_shows_failure_until_retried() {
        let a = pdf("a.pdf");
        let mut app = desk(&[(&a, A_URL)]);
        add(&mut app, vec![a]);
        let a_id = app.controller.entries()[0].id;

        let _ = app.update(Message::ArtifactFetched(
            A_URL.to_string(),
            Err(ServiceError::Status(404)),
        ));
        assert_eq!(app.download_status(), DownloadStatus::Failed);
        assert!(app.display.is_none());
        assert!(app.pending_artifact.is_none());

        // Re-selecting does not silently fetch again
        let _ = app.update(Message::Select(a_id));
        assert!(app.pending_artifact.is_none());
        assert_eq!(app.download_status(), DownloadStatus::Failed);

        let _ = app.update(Message::RetryDownload);
        assert_eq!(app.pending_artifact.as_deref(), Some(A_URL));
        assert_eq!(app.download_status(), DownloadStatus::Idle);

        let _ = app.update(Message::ArtifactFetched(A_URL.to_string(), Ok(png_bytes())));
        assert_eq!(app.download_status(), DownloadStatus::Ready);
        assert!(app.display.is_some());
    }

    #[test]
    fn test_undecodable_image_gets_no_bitmap() {
        let mut app = desk(&[]);
        add(&mut app, vec![sample_file("logo.svg", "image/svg+xml", b"<svg/>")]);
        assert_eq!(app.controller.preview_state(), &PreviewState::Inline);
        assert!(app.display.is_none());
        assert!(app.pending_display.is_none());

        let mut app = desk(&[]);
        add(&mut app, vec![sample_file("photo.png", "image/png", &png_bytes())]);
        assert!(app.display.is_some());
    }

    #[test]
    fn test_submit_failure_keeps_files_and_success_clears_them() {
        let mut app = desk(&[]);
        add(&mut app, vec![pdf("a.pdf"), pdf("b.pdf")]);

        let _ = app.update(Message::Submit);
        assert!(app.controller.is_submitting());
        assert!(app.status.starts_with("Uploading 2"));

        let _ = app.finish_submit(&Err(ServiceError::Status(500)));
        assert!(!app.controller.is_submitting());
        assert_eq!(app.controller.len(), 2);
        assert!(app.status.starts_with("Upload failed"));

        let _ = app.update(Message::Submit);
        let _ = app.finish_submit(&Ok(()));
        assert!(app.controller.is_empty());
        assert!(app.display.is_none());
        assert_eq!(app.download_status(), DownloadStatus::Idle);
    }
}
