/// File intake
///
/// This module handles:
/// - Accepted file types and MIME detection (mime.rs)
/// - Reading, fingerprinting and folder import (loader.rs)

pub mod loader;
pub mod mime;
