//! Upload harness for the pressure-watcher service
//!
//! Sends a synthetic or user-supplied gauge photo to `/upload-image` and
//! reports the outcome as HTML result panels.

pub mod dummy_image;
pub mod error;
pub mod harness;
pub mod panel;

pub use dummy_image::{create_dummy_image, ImageBlob};
pub use error::{HarnessError, Result};
pub use harness::{guess_media_type, Harness, SelectedFile, DEFAULT_API_URL};
pub use panel::{PanelKind, ResultDisplay, ResultPanel};
