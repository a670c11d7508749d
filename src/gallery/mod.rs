//! Gallery core: viewer state machine, swipe detection and the media store
//!
//! Pure state, no rendering or I/O. The TUI and the CLI drive these types.

pub mod store;
pub mod swipe;
pub mod viewer;

pub use store::{FetchOutcome, FetchTicket, LoadState, MediaStore};
pub use swipe::{SwipeDirection, SwipeTracker};
pub use viewer::{GalleryEvent, GalleryState, GalleryViewer, OpenGallery};
