/// Preview resolver
///
/// Decides what to show for the selected file:
/// - images are shown inline from their own bytes, no network
/// - anything else is looked up in the converted-preview cache by
///   content fingerprint, and converted remotely on a miss
///
/// Each conversion is tagged with a ticket. A result whose ticket is no
/// longer current (the user selected something else meanwhile) still fills
/// the cache but never touches what is on screen.

use super::cache::ConvertedCache;
use super::data::{ColorMode, EntryId, FileEntry, FilePayload, Fingerprint, Orientation};
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Empty,
    Loading,
    Inline,
    Converted {
        url: String,
    },
    Failed,
}

/// Identifies one issued conversion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversionTicket {
    pub entry: EntryId,
    pub generation: u64,
}

/// Everything needed to record a conversion result once it arrives
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub ticket: ConversionTicket,
    pub fingerprint: Fingerprint,
    pub file_name: String,
}

impl ConversionJob {
    pub fn finish(self, result: Result<String, ServiceError>) -> ConversionOutcome {
        ConversionOutcome { job: self, result }
    }
}

/// A conversion the shell must send to the service
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub job: ConversionJob,
    pub payload: FilePayload,
}

impl ConversionRequest {
    pub fn ticket(&self) -> ConversionTicket {
        self.job.ticket
    }
}

/// A finished conversion, successful or not
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub job: ConversionJob,
    pub result: Result<String, ServiceError>,
}

/// Display-only transform derived from an entry's settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayTransform {
    pub rotate: bool,
    pub grayscale: bool,
}

impl DisplayTransform {
    pub fn for_entry(entry: &FileEntry) -> Self {
        Self {
            rotate: entry.orientation == Orientation::Landscape,
            grayscale: entry.color == ColorMode::Bw,
        }
    }

    pub fn is_identity(&self) -> bool {
        !self.rotate && !self.grayscale
    }
}

#[derive(Debug, Default)]
pub struct PreviewResolver {
    state: PreviewState,
    current: Option<ConversionTicket>,
    next_generation: u64,
}

impl PreviewResolver {
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Recompute the preview for a (possibly new) selection.
    /// Returns a request when a network conversion must be issued.
    pub fn resolve(&mut self, entry: Option<&FileEntry>, cache: &ConvertedCache) -> Option<ConversionRequest> {
        let Some(entry) = entry else {
            self.state = PreviewState::Empty;
            self.current = None;
            return None;
        };

        // Already converting this very entry: keep waiting on that request
        if self.state == PreviewState::Loading && self.current.map(|t| t.entry) == Some(entry.id) {
            return None;
        }

        self.current = None;

        if entry.payload.is_image() {
            self.state = PreviewState::Inline;
            return None;
        }

        match cache.get(&entry.fingerprint) {
            Ok(Some(url)) => {
                tracing::debug!("Preview cache hit for {}", entry.name());
                self.state = PreviewState::Converted { url };
                return None;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Preview cache lookup failed, treating as miss: {}", e),
        }

        Some(self.issue(entry))
    }

    /// Re-issue the conversion for an entry whose preview failed
    pub fn retry(&mut self, entry: &FileEntry) -> Option<ConversionRequest> {
        if self.state != PreviewState::Failed || entry.payload.is_image() {
            return None;
        }
        Some(self.issue(entry))
    }

    fn issue(&mut self, entry: &FileEntry) -> ConversionRequest {
        let ticket = ConversionTicket {
            entry: entry.id,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.current = Some(ticket);
        self.state = PreviewState::Loading;

        tracing::info!("Converting {} for preview", entry.name());

        ConversionRequest {
            job: ConversionJob {
                ticket,
                fingerprint: entry.fingerprint.clone(),
                file_name: entry.payload.name.clone(),
            },
            payload: entry.payload.clone(),
        }
    }

    /// Record a finished conversion. Returns true if it changed what is shown.
    pub fn finish(&mut self, outcome: ConversionOutcome, cache: &ConvertedCache) -> bool {
        let ConversionOutcome { job, result } = outcome;

        let next_state = match result {
            Ok(url) if !url.is_empty() => {
                if let Err(e) = cache.insert(&job.fingerprint, &job.file_name, &url) {
                    tracing::warn!("Failed to cache preview for {}: {}", job.file_name, e);
                }
                PreviewState::Converted { url }
            }
            Ok(_) => {
                tracing::warn!("Conversion of {} returned an empty URL", job.file_name);
                PreviewState::Failed
            }
            Err(e) => {
                tracing::warn!("Conversion of {} failed: {}", job.file_name, e);
                PreviewState::Failed
            }
        };

        if self.current != Some(job.ticket) {
            tracing::debug!("Discarding stale conversion result for {}", job.file_name);
            return false;
        }

        self.current = None;
        self.state = next_state;
        true
    }

    pub fn reset(&mut self) {
        self.state = PreviewState::Empty;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::sample_file;

    fn entry(id: u64, name: &str, mime: &str, bytes: &[u8]) -> FileEntry {
        FileEntry::new(EntryId(id), sample_file(name, mime, bytes))
    }

    #[test]
    fn test_no_selection_is_empty() {
        let cache = ConvertedCache::open_in_memory().unwrap();
        let mut resolver = PreviewResolver::default();
        assert!(resolver.resolve(None, &cache).is_none());
        assert_eq!(resolver.state(), &PreviewState::Empty);
    }

    #[test]
    fn test_image_is_inline_without_request() {
        let cache = ConvertedCache::open_in_memory().unwrap();
        let mut resolver = PreviewResolver::default();
        let photo = entry(0, "photo.png", "image/png", b"png");

        assert!(resolver.resolve(Some(&photo), &cache).is_none());
        assert_eq!(resolver.state(), &PreviewState::Inline);
    }

    #[test]
    fn test_document_issues_one_request_then_uses_cache() {
        let cache = ConvertedCache::open_in_memory().unwrap();
        let mut resolver = PreviewResolver::default();
        let doc = entry(1, "doc.pdf", "application/pdf", b"pdf");

        let request = resolver.resolve(Some(&doc), &cache).expect("conversion request");
        assert_eq!(resolver.state(), &PreviewState::Loading);

        // Selecting it again while in flight does not issue a second request
        assert!(resolver.resolve(Some(&doc), &cache).is_none());

        let applied = resolver.finish(request.job.finish(Ok("https://host/doc.png".into())), &cache);
        assert!(applied);
        assert_eq!(
            resolver.state(),
            &PreviewState::Converted { url: "https://host/doc.png".into() }
        );

        assert!(resolver.resolve(Some(&doc), &cache).is_none());
        assert!(resolver.resolve(Some(&doc), &cache).is_none());
    }

    #[test]
    fn test_failure_and_empty_url_fail() {
        let cache = ConvertedCache::open_in_memory().unwrap();
        let mut resolver = PreviewResolver::default();
        let doc = entry(1, "doc.pdf", "application/pdf", b"pdf");

        let request = resolver.resolve(Some(&doc), &cache).unwrap();
        resolver.finish(request.job.finish(Err(ServiceError::Status(500))), &cache);
        assert_eq!(resolver.state(), &PreviewState::Failed);
        assert_eq!(cache.len().unwrap(), 0);

        let request = resolver.retry(&doc).expect("retry request");
        resolver.finish(request.job.finish(Ok(String::new())), &cache);
        assert_eq!(resolver.state(), &PreviewState::Failed);
    }

    #[test]
    fn test_stale_result_is_discarded_but_cached() {
        let cache = ConvertedCache::open_in_memory().unwrap();
        let mut resolver = PreviewResolver::default();
        let first = entry(1, "first.pdf", "application/pdf", b"first");
        let second = entry(2, "second.pdf", "application/pdf", b"second");

        let first_request = resolver.resolve(Some(&first), &cache).unwrap();
        let second_request = resolver.resolve(Some(&second), &cache).unwrap();
        assert_ne!(first_request.ticket(), second_request.ticket());

        let applied = resolver.finish(first_request.job.finish(Ok("https://host/1.png".into())), &cache);
        assert!(!applied);
        assert_eq!(resolver.state(), &PreviewState::Loading);
        assert_eq!(cache.get(&first.fingerprint).unwrap().as_deref(), Some("https://host/1.png"));

        assert!(resolver.finish(second_request.job.finish(Ok("https://host/2.png".into())), &cache));
        assert_eq!(resolver.state(), &PreviewState::Converted { url: "https://host/2.png".into() });
    }

    #[test]
    fn test_retry_only_from_failed() {
        let mut resolver = PreviewResolver::default();
        let doc = entry(1, "doc.pdf", "application/pdf", b"pdf");
        assert!(resolver.retry(&doc).is_none());
    }

    #[test]
    fn test_display_transform() {
        let mut doc = entry(1, "doc.pdf", "application/pdf", b"pdf");
        assert!(DisplayTransform::for_entry(&doc).is_identity());

        doc.orientation = Orientation::Landscape;
        doc.color = ColorMode::Bw;
        let transform = DisplayTransform::for_entry(&doc);
        assert!(transform.rotate);
        assert!(transform.grayscale);
    }
}
