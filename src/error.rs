// Error type for platform startup failures
//
// Every startup stage returns Result<_, PlatformError> so the caller can
// tell total failure apart from success before running the message loop.
// Teardown is best-effort and never reports.

use std::fmt;

use thiserror::Error;

/// Which startup stage produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Window,
    Device,
    Swapchain,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Window => f.write_str("window"),
            Stage::Device => f.write_str("device"),
            Stage::Swapchain => f.write_str("swapchain"),
        }
    }
}

/// A failed OS or graphics API call, tagged with the stage it aborted.
///
/// `code` carries the HRESULT (or HRESULT-wrapped Win32 error) exactly as
/// the platform reported it.
#[derive(Debug, Clone, Error)]
#[error("{stage} startup failed: {what} (hresult {code:#010x})")]
pub struct PlatformError {
    pub stage: Stage,
    pub code: u32,
    pub what: String,
}

impl PlatformError {
    pub fn new(stage: Stage, code: u32, what: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            what: what.into(),
        }
    }

    /// Wrap an error returned by a `windows` crate call.
    #[cfg(windows)]
    pub(crate) fn from_platform(stage: Stage, what: &str, source: &windows::core::Error) -> Self {
        Self::new(stage, source.code().0 as u32, format!("{what}: {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_stage_and_code() {
        let err = PlatformError::new(Stage::Device, 0x887A_0004, "D3D11CreateDevice");
        let text = err.to_string();
        assert!(text.contains("device startup failed"), "{text}");
        assert!(text.contains("D3D11CreateDevice"), "{text}");
        assert!(text.contains("0x887a0004"), "{text}");
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(Stage::Window.to_string(), "window");
        assert_eq!(Stage::Swapchain.to_string(), "swapchain");
    }
}
