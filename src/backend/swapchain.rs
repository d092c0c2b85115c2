// Swapchain - window presentation surface
//
// Double-buffered BGRA8 flip-sequential swapchain bound to the output
// window, plus a render-target view over back buffer 0. Created from the
// factory that produced the device's adapter.

/// Number of back buffers. Fixed: the surface is double-buffered.
pub const BACK_BUFFER_COUNT: u32 = 2;

/// Presentation surface description. The pixel format (32-bit BGRA) and
/// flip-sequential swap effect are fixed; DXGI sizes the buffers to the
/// output window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub buffer_count: u32,
    pub windowed: bool,
}

impl Default for SwapchainDesc {
    fn default() -> Self {
        Self {
            buffer_count: BACK_BUFFER_COUNT,
            windowed: true,
        }
    }
}

#[cfg(windows)]
pub use self::dxgi::Swapchain;

#[cfg(windows)]
mod dxgi {
    use windows::core::Interface;
    use windows::Win32::Graphics::Direct3D11::{
        ID3D11RenderTargetView, ID3D11Texture2D, D3D11_TEXTURE2D_DESC,
    };
    use windows::Win32::Graphics::Dxgi::Common::{
        DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_SAMPLE_DESC,
    };
    use windows::Win32::Graphics::Dxgi::{
        IDXGIDevice, IDXGIFactory, IDXGISwapChain, DXGI_SWAP_CHAIN_DESC,
        DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL, DXGI_USAGE_RENDER_TARGET_OUTPUT,
    };

    use super::SwapchainDesc;
    use crate::backend::device::GpuDevice;
    use crate::backend::window::Win32Window;
    use crate::error::{PlatformError, Stage};

    /// A created swapchain with its current back buffer and render-target
    /// view. Holds no reference to the window or device it was built from;
    /// the owning session guarantees it never outlives them.
    pub struct Swapchain {
        swapchain: IDXGISwapChain,
        back_buffer: ID3D11Texture2D,
        render_target: ID3D11RenderTargetView,
        back_buffer_desc: D3D11_TEXTURE2D_DESC,
    }

    impl Swapchain {
        /// Build the swapchain against the given window and device. Any
        /// failing step aborts the remaining steps.
        pub fn create(
            window: &Win32Window,
            device: &GpuDevice,
            desc: &SwapchainDesc,
        ) -> Result<Self, PlatformError> {
            let mut chain_desc = DXGI_SWAP_CHAIN_DESC {
                BufferCount: desc.buffer_count,
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                OutputWindow: window.hwnd(),
                Windowed: desc.windowed.into(),
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                ..Default::default()
            };
            chain_desc.BufferDesc.Format = DXGI_FORMAT_B8G8R8A8_UNORM;

            // The swapchain must come from the factory that produced the
            // device's adapter.
            let factory: IDXGIFactory = unsafe {
                let dxgi_device: IDXGIDevice = device.device().cast().map_err(|e| {
                    PlatformError::from_platform(Stage::Swapchain, "ID3D11Device::cast", &e)
                })?;
                let adapter = dxgi_device.GetAdapter().map_err(|e| {
                    PlatformError::from_platform(Stage::Swapchain, "IDXGIDevice::GetAdapter", &e)
                })?;
                adapter.GetParent().map_err(|e| {
                    PlatformError::from_platform(Stage::Swapchain, "IDXGIAdapter::GetParent", &e)
                })?
            };

            let mut swapchain = None;
            unsafe { factory.CreateSwapChain(device.device(), &chain_desc, &mut swapchain) }
                .ok()
                .map_err(|e| {
                    PlatformError::from_platform(Stage::Swapchain, "CreateSwapChain", &e)
                })?;
            let swapchain = swapchain.ok_or_else(|| {
                PlatformError::new(Stage::Swapchain, 0, "factory returned no swapchain")
            })?;

            let back_buffer: ID3D11Texture2D =
                unsafe { swapchain.GetBuffer(0) }.map_err(|e| {
                    PlatformError::from_platform(Stage::Swapchain, "IDXGISwapChain::GetBuffer", &e)
                })?;

            let mut render_target = None;
            unsafe {
                device
                    .device()
                    .CreateRenderTargetView(&back_buffer, None, Some(&mut render_target))
            }
            .map_err(|e| {
                PlatformError::from_platform(Stage::Swapchain, "CreateRenderTargetView", &e)
            })?;
            let render_target = render_target.ok_or_else(|| {
                PlatformError::new(Stage::Swapchain, 0, "device returned no render target view")
            })?;

            // Read the texture description back for bookkeeping.
            let mut back_buffer_desc = D3D11_TEXTURE2D_DESC::default();
            unsafe { back_buffer.GetDesc(&mut back_buffer_desc) };

            log::info!(
                "Created swapchain with {} buffers at {}x{}",
                desc.buffer_count,
                back_buffer_desc.Width,
                back_buffer_desc.Height
            );

            Ok(Self {
                swapchain,
                back_buffer,
                render_target,
                back_buffer_desc,
            })
        }

        pub fn swapchain(&self) -> &IDXGISwapChain {
            &self.swapchain
        }

        pub fn back_buffer(&self) -> &ID3D11Texture2D {
            &self.back_buffer
        }

        pub fn render_target(&self) -> &ID3D11RenderTargetView {
            &self.render_target
        }

        pub fn back_buffer_desc(&self) -> &D3D11_TEXTURE2D_DESC {
            &self.back_buffer_desc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_is_double_buffered_and_windowed() {
        let desc = SwapchainDesc::default();
        assert_eq!(desc.buffer_count, 2);
        assert!(desc.windowed);
    }
}
