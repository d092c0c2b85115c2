// Win32 + Direct3D11 application bootstrap
//
// Startup protocol: window -> device -> swapchain, teardown in exact
// reverse order. The Session sequences the stages through the Platform
// trait; the production Win32 implementation lives in backend::win32 and
// only compiles on Windows, so the sequencing logic stays testable
// everywhere.

pub mod backend;
pub mod config;
pub mod error;
pub mod session;

pub use backend::Platform;
pub use error::{PlatformError, Stage};
pub use session::Session;
