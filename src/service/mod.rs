/// Remote conversion / upload service
///
/// - `batch.rs` - the multipart field layout of a batch submission
/// - `client.rs` - reqwest client for conversion, upload and artifact download

pub mod batch;
pub mod client;

pub use batch::BatchRequest;
pub use client::ServiceClient;
