// Win32 platform glue
//
// Binds the concrete window, device, and swapchain implementations to the
// Platform trait the session sequences.

use windows::Win32::Foundation::HINSTANCE;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;

use crate::backend::device::{FeatureLevel, GpuDevice};
use crate::backend::swapchain::{Swapchain, SwapchainDesc};
use crate::backend::window::{Win32Window, WindowDesc};
use crate::backend::Platform;
use crate::error::{PlatformError, Stage};

pub struct Win32Platform {
    hinstance: HINSTANCE,
    debug_layer: bool,
}

impl Win32Platform {
    pub fn new(hinstance: HINSTANCE, debug_layer: bool) -> Self {
        Self {
            hinstance,
            debug_layer,
        }
    }

    /// Build a platform bound to the current process's module handle.
    pub fn from_process(debug_layer: bool) -> Result<Self, PlatformError> {
        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|e| PlatformError::from_platform(Stage::Window, "GetModuleHandleW", &e))?;
        Ok(Self::new(module.into(), debug_layer))
    }
}

impl Platform for Win32Platform {
    type Window = Win32Window;
    type Device = GpuDevice;
    type Swapchain = Swapchain;

    fn create_window(&mut self, desc: &WindowDesc) -> Result<Win32Window, PlatformError> {
        Win32Window::create(self.hinstance, desc)
    }

    fn create_device(&mut self, candidates: &[FeatureLevel]) -> Result<GpuDevice, PlatformError> {
        GpuDevice::create(candidates, self.debug_layer)
    }

    fn create_swapchain(
        &mut self,
        window: &Win32Window,
        device: &GpuDevice,
        desc: &SwapchainDesc,
    ) -> Result<Swapchain, PlatformError> {
        Swapchain::create(window, device, desc)
    }

    fn run_message_loop(&mut self, window: &mut Win32Window) -> Result<(), PlatformError> {
        window.message_loop();
        Ok(())
    }

    fn destroy_swapchain(&mut self, swapchain: Swapchain) {
        // COM references are released on drop.
        drop(swapchain);
    }

    fn destroy_device(&mut self, device: GpuDevice) {
        drop(device);
    }

    fn destroy_window(&mut self, window: Win32Window) {
        window.destroy();
    }
}
