// D3D11 device - core GPU interface
//
// Responsibilities:
// - Feature level negotiation (highest mutually supported wins)
// - Device + immediate context creation against the hardware driver
// - Debug layer opt-in for debug builds

use std::fmt;

/// Direct3D feature level, ordered from oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureLevel {
    Level9_1,
    Level9_2,
    Level9_3,
    Level10_0,
    Level10_1,
    Level11_0,
    Level11_1,
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureLevel::Level9_1 => "9.1",
            FeatureLevel::Level9_2 => "9.2",
            FeatureLevel::Level9_3 => "9.3",
            FeatureLevel::Level10_0 => "10.0",
            FeatureLevel::Level10_1 => "10.1",
            FeatureLevel::Level11_0 => "11.0",
            FeatureLevel::Level11_1 => "11.1",
        };
        f.write_str(name)
    }
}

/// Candidate levels offered during device creation.
pub const FEATURE_LEVELS: [FeatureLevel; 7] = [
    FeatureLevel::Level9_1,
    FeatureLevel::Level9_2,
    FeatureLevel::Level9_3,
    FeatureLevel::Level10_0,
    FeatureLevel::Level10_1,
    FeatureLevel::Level11_0,
    FeatureLevel::Level11_1,
];

/// Candidates reordered newest-first, the order they are offered to the
/// driver. D3D11 accepts the first entry it supports, so newest-first makes
/// the highest mutually supported level win.
pub fn newest_first(candidates: &[FeatureLevel]) -> Vec<FeatureLevel> {
    let mut ordered = candidates.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered
}

/// Negotiation rule: the highest candidate the adapter supports, or `None`
/// when no candidate is supported at all.
pub fn select_feature_level(
    candidates: &[FeatureLevel],
    supports: impl Fn(FeatureLevel) -> bool,
) -> Option<FeatureLevel> {
    newest_first(candidates).into_iter().find(|&level| supports(level))
}

#[cfg(windows)]
pub use self::d3d11::GpuDevice;

#[cfg(windows)]
mod d3d11 {
    use windows::Win32::Graphics::Direct3D::{
        D3D_DRIVER_TYPE_HARDWARE, D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_10_0,
        D3D_FEATURE_LEVEL_10_1, D3D_FEATURE_LEVEL_11_0, D3D_FEATURE_LEVEL_11_1,
        D3D_FEATURE_LEVEL_9_1, D3D_FEATURE_LEVEL_9_2, D3D_FEATURE_LEVEL_9_3,
    };
    use windows::Win32::Graphics::Direct3D11::{
        D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext, D3D11_CREATE_DEVICE_BGRA_SUPPORT,
        D3D11_CREATE_DEVICE_DEBUG, D3D11_SDK_VERSION,
    };

    use super::{newest_first, FeatureLevel};
    use crate::error::{PlatformError, Stage};

    impl FeatureLevel {
        fn to_d3d(self) -> D3D_FEATURE_LEVEL {
            match self {
                FeatureLevel::Level9_1 => D3D_FEATURE_LEVEL_9_1,
                FeatureLevel::Level9_2 => D3D_FEATURE_LEVEL_9_2,
                FeatureLevel::Level9_3 => D3D_FEATURE_LEVEL_9_3,
                FeatureLevel::Level10_0 => D3D_FEATURE_LEVEL_10_0,
                FeatureLevel::Level10_1 => D3D_FEATURE_LEVEL_10_1,
                FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
                FeatureLevel::Level11_1 => D3D_FEATURE_LEVEL_11_1,
            }
        }

        fn from_d3d(level: D3D_FEATURE_LEVEL) -> Option<Self> {
            match level {
                D3D_FEATURE_LEVEL_9_1 => Some(FeatureLevel::Level9_1),
                D3D_FEATURE_LEVEL_9_2 => Some(FeatureLevel::Level9_2),
                D3D_FEATURE_LEVEL_9_3 => Some(FeatureLevel::Level9_3),
                D3D_FEATURE_LEVEL_10_0 => Some(FeatureLevel::Level10_0),
                D3D_FEATURE_LEVEL_10_1 => Some(FeatureLevel::Level10_1),
                D3D_FEATURE_LEVEL_11_0 => Some(FeatureLevel::Level11_0),
                D3D_FEATURE_LEVEL_11_1 => Some(FeatureLevel::Level11_1),
                _ => None,
            }
        }
    }

    /// D3D11 device wrapper. Created once, immutable thereafter; COM
    /// references are released when the wrapper drops.
    pub struct GpuDevice {
        device: ID3D11Device,
        context: ID3D11DeviceContext,
        feature_level: FeatureLevel,
    }

    impl GpuDevice {
        /// Create the device against the hardware adapter.
        ///
        /// Candidates are offered newest-first so the driver accepts the
        /// highest level it supports. No WARP fallback is attempted.
        pub fn create(
            candidates: &[FeatureLevel],
            debug_layer: bool,
        ) -> Result<Self, PlatformError> {
            let levels: Vec<D3D_FEATURE_LEVEL> = newest_first(candidates)
                .into_iter()
                .map(FeatureLevel::to_d3d)
                .collect();

            let mut flags = D3D11_CREATE_DEVICE_BGRA_SUPPORT;
            if debug_layer {
                flags |= D3D11_CREATE_DEVICE_DEBUG;
            }

            let mut device = None;
            let mut context = None;
            let mut negotiated = D3D_FEATURE_LEVEL_9_1;

            unsafe {
                D3D11CreateDevice(
                    None,
                    D3D_DRIVER_TYPE_HARDWARE,
                    None,
                    flags,
                    Some(&levels),
                    D3D11_SDK_VERSION,
                    Some(&mut device),
                    Some(&mut negotiated),
                    Some(&mut context),
                )
            }
            .map_err(|e| PlatformError::from_platform(Stage::Device, "D3D11CreateDevice", &e))?;

            let device = device.ok_or_else(|| {
                PlatformError::new(Stage::Device, 0, "D3D11CreateDevice returned no device")
            })?;
            let context = context.ok_or_else(|| {
                PlatformError::new(Stage::Device, 0, "D3D11CreateDevice returned no context")
            })?;
            let feature_level = FeatureLevel::from_d3d(negotiated).ok_or_else(|| {
                PlatformError::new(Stage::Device, 0, "driver reported an unknown feature level")
            })?;

            log::info!("Created D3D11 device at feature level {feature_level}");

            Ok(Self {
                device,
                context,
                feature_level,
            })
        }

        pub fn device(&self) -> &ID3D11Device {
            &self.device
        }

        pub fn context(&self) -> &ID3D11DeviceContext {
            &self.context
        }

        pub fn feature_level(&self) -> FeatureLevel {
            self.feature_level
        }
    }
}
