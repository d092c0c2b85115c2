// Backend module - platform abstraction layer
//
// The session drives window, device, and swapchain startup through the
// Platform trait; backend::win32 is the production implementation and only
// compiles on Windows. Tests drive the session with an in-memory fake.

pub mod device;
pub mod swapchain;
pub mod window;

#[cfg(windows)]
pub mod win32;

pub use device::{select_feature_level, FeatureLevel, FEATURE_LEVELS};
pub use swapchain::{SwapchainDesc, BACK_BUFFER_COUNT};
pub use window::WindowDesc;

#[cfg(windows)]
pub use win32::Win32Platform;

use crate::error::PlatformError;

/// The platform services the session sequences: window, device, and
/// swapchain creation, the message loop, and best-effort teardown.
pub trait Platform {
    type Window;
    type Device;
    type Swapchain;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<Self::Window, PlatformError>;

    /// Create the graphics device, negotiating the highest feature level
    /// from `candidates` that the hardware supports.
    fn create_device(&mut self, candidates: &[FeatureLevel])
        -> Result<Self::Device, PlatformError>;

    /// Create the presentation surface. The window and device are borrowed
    /// for the duration of the call only; the swapchain must not keep them.
    fn create_swapchain(
        &mut self,
        window: &Self::Window,
        device: &Self::Device,
        desc: &SwapchainDesc,
    ) -> Result<Self::Swapchain, PlatformError>;

    /// Pump messages until quit is observed.
    fn run_message_loop(&mut self, window: &mut Self::Window) -> Result<(), PlatformError>;

    fn destroy_swapchain(&mut self, swapchain: Self::Swapchain);
    fn destroy_device(&mut self, device: Self::Device);
    fn destroy_window(&mut self, window: Self::Window);
}
