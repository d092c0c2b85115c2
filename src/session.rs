// Session - startup sequencing and teardown
//
// Startup runs window -> device -> swapchain in strict order; a failure at
// any stage tears down whatever was already created before the error
// propagates. Shutdown is the exact reverse of startup and is idempotent,
// so it is safe to call after a failed startup.

use crate::backend::{Platform, SwapchainDesc, WindowDesc, FEATURE_LEVELS};
use crate::error::{PlatformError, Stage};

pub struct Session<P: Platform> {
    platform: P,
    window_desc: WindowDesc,
    swapchain_desc: SwapchainDesc,
    window: Option<P::Window>,
    device: Option<P::Device>,
    swapchain: Option<P::Swapchain>,
}

impl<P: Platform> Session<P> {
    pub fn new(platform: P, window_desc: WindowDesc) -> Self {
        Self {
            platform,
            window_desc,
            swapchain_desc: SwapchainDesc::default(),
            window: None,
            device: None,
            swapchain: None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run window -> device -> swapchain startup. On failure the stages
    /// already created are destroyed, in reverse order, before the error
    /// is returned; the session never proceeds with partial state.
    pub fn startup(&mut self) -> Result<(), PlatformError> {
        // Overwriting live stages would leak them; shutdown first.
        if self.window.is_some() {
            return Err(PlatformError::new(
                Stage::Window,
                0,
                "startup called on an already-started session",
            ));
        }

        log::info!("Session startup: window -> device -> swapchain");

        let window = self.platform.create_window(&self.window_desc)?;

        let device = match self.platform.create_device(&FEATURE_LEVELS) {
            Ok(device) => device,
            Err(err) => {
                log::error!("Device startup failed, rolling back window: {err}");
                self.platform.destroy_window(window);
                return Err(err);
            }
        };

        let swapchain =
            match self
                .platform
                .create_swapchain(&window, &device, &self.swapchain_desc)
            {
                Ok(swapchain) => swapchain,
                Err(err) => {
                    log::error!("Swapchain startup failed, rolling back: {err}");
                    self.platform.destroy_device(device);
                    self.platform.destroy_window(window);
                    return Err(err);
                }
            };

        self.window = Some(window);
        self.device = Some(device);
        self.swapchain = Some(swapchain);

        log::info!("Session startup complete");
        Ok(())
    }

    /// Run the message loop; returns once the window observes quit.
    pub fn run(&mut self) -> Result<(), PlatformError> {
        let Some(window) = self.window.as_mut() else {
            return Err(PlatformError::new(
                Stage::Window,
                0,
                "run called without a successful startup",
            ));
        };
        self.platform.run_message_loop(window)
    }

    /// Tear down swapchain -> device -> window, the exact reverse of
    /// startup. Best-effort and idempotent.
    pub fn shutdown(&mut self) {
        if let Some(swapchain) = self.swapchain.take() {
            self.platform.destroy_swapchain(swapchain);
        }
        if let Some(device) = self.device.take() {
            self.platform.destroy_device(device);
        }
        if let Some(window) = self.window.take() {
            self.platform.destroy_window(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{select_feature_level, FeatureLevel};

    /// Scripted platform: records every call and fails on demand.
    struct FakePlatform {
        /// Highest level the simulated adapter supports; `None` means no
        /// usable adapter at all.
        max_level: Option<FeatureLevel>,
        fail_window: bool,
        fail_swapchain: bool,
        calls: Vec<&'static str>,
        negotiated: Option<FeatureLevel>,
        swapchain_descs: Vec<SwapchainDesc>,
        window_descs: Vec<WindowDesc>,
    }

    impl FakePlatform {
        fn new(max_level: Option<FeatureLevel>) -> Self {
            Self {
                max_level,
                fail_window: false,
                fail_swapchain: false,
                calls: Vec::new(),
                negotiated: None,
                swapchain_descs: Vec::new(),
                window_descs: Vec::new(),
            }
        }
    }

    struct FakeWindow;
    struct FakeDevice;
    struct FakeSwapchain;

    impl Platform for FakePlatform {
        type Window = FakeWindow;
        type Device = FakeDevice;
        type Swapchain = FakeSwapchain;

        fn create_window(&mut self, desc: &WindowDesc) -> Result<FakeWindow, PlatformError> {
            self.calls.push("create_window");
            self.window_descs.push(desc.clone());
            if self.fail_window {
                return Err(PlatformError::new(Stage::Window, 0x5, "CreateWindowExW"));
            }
            Ok(FakeWindow)
        }

        fn create_device(
            &mut self,
            candidates: &[FeatureLevel],
        ) -> Result<FakeDevice, PlatformError> {
            self.calls.push("create_device");
            let Some(max_level) = self.max_level else {
                return Err(PlatformError::new(
                    Stage::Device,
                    0x887A_0004,
                    "no usable adapter",
                ));
            };
            match select_feature_level(candidates, |level| level <= max_level) {
                Some(level) => {
                    self.negotiated = Some(level);
                    Ok(FakeDevice)
                }
                None => Err(PlatformError::new(
                    Stage::Device,
                    0x887A_0004,
                    "no supported feature level",
                )),
            }
        }

        fn create_swapchain(
            &mut self,
            _window: &FakeWindow,
            _device: &FakeDevice,
            desc: &SwapchainDesc,
        ) -> Result<FakeSwapchain, PlatformError> {
            self.calls.push("create_swapchain");
            self.swapchain_descs.push(desc.clone());
            if self.fail_swapchain {
                return Err(PlatformError::new(Stage::Swapchain, 0x1, "CreateSwapChain"));
            }
            Ok(FakeSwapchain)
        }

        fn run_message_loop(&mut self, _window: &mut FakeWindow) -> Result<(), PlatformError> {
            // Simulates a window-close arriving: the loop observes quit and
            // returns to the caller.
            self.calls.push("run_message_loop");
            Ok(())
        }

        fn destroy_swapchain(&mut self, _swapchain: FakeSwapchain) {
            self.calls.push("destroy_swapchain");
        }

        fn destroy_device(&mut self, _device: FakeDevice) {
            self.calls.push("destroy_device");
        }

        fn destroy_window(&mut self, _window: FakeWindow) {
            self.calls.push("destroy_window");
        }
    }

    fn session(max_level: Option<FeatureLevel>) -> Session<FakePlatform> {
        Session::new(FakePlatform::new(max_level), WindowDesc::default())
    }

    #[test]
    fn startup_and_shutdown_run_in_mirror_order() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        session.shutdown();
        assert_eq!(
            session.platform().calls,
            [
                "create_window",
                "create_device",
                "create_swapchain",
                "destroy_swapchain",
                "destroy_device",
                "destroy_window",
            ]
        );
    }

    #[test]
    fn negotiates_highest_supported_level() {
        let mut session = session(Some(FeatureLevel::Level10_1));
        session.startup().unwrap();
        assert_eq!(
            session.platform().negotiated,
            Some(FeatureLevel::Level10_1)
        );
    }

    #[test]
    fn device_failure_skips_swapchain_and_rolls_back_window() {
        let mut session = session(None);
        let err = session.startup().unwrap_err();
        assert_eq!(err.stage, Stage::Device);
        let calls = &session.platform().calls;
        assert!(!calls.contains(&"create_swapchain"));
        assert_eq!(
            calls.as_slice(),
            ["create_window", "create_device", "destroy_window"]
        );
    }

    #[test]
    fn swapchain_failure_rolls_back_device_then_window() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.platform.fail_swapchain = true;
        let err = session.startup().unwrap_err();
        assert_eq!(err.stage, Stage::Swapchain);
        assert_eq!(
            session.platform().calls,
            [
                "create_window",
                "create_device",
                "create_swapchain",
                "destroy_device",
                "destroy_window",
            ]
        );
    }

    #[test]
    fn window_failure_aborts_everything_else() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.platform.fail_window = true;
        let err = session.startup().unwrap_err();
        assert_eq!(err.stage, Stage::Window);
        assert_eq!(session.platform().calls, ["create_window"]);
    }

    #[test]
    fn swapchain_request_is_double_buffered_and_windowed() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        let desc = &session.platform().swapchain_descs[0];
        assert_eq!(desc.buffer_count, 2);
        assert!(desc.windowed);
    }

    #[test]
    fn window_request_uses_default_client_area() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        let desc = &session.platform().window_descs[0];
        assert_eq!((desc.client_width, desc.client_height), (1024, 768));
    }

    #[test]
    fn second_startup_is_rejected_and_leaks_nothing() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        let err = session.startup().unwrap_err();
        assert_eq!(err.stage, Stage::Window);
        // The platform saw exactly one round of creation.
        let creates = session
            .platform()
            .calls
            .iter()
            .filter(|call| call.starts_with("create"))
            .count();
        assert_eq!(creates, 3);
        // The original stages are still held and destroyed on shutdown.
        session.shutdown();
        let destroys = session
            .platform()
            .calls
            .iter()
            .filter(|call| call.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 3);
    }

    #[test]
    fn run_returns_after_quit_is_observed() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        session.run().unwrap();
        assert!(session.platform().calls.contains(&"run_message_loop"));
    }

    #[test]
    fn run_without_startup_is_an_error() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        assert!(session.run().is_err());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut session = session(Some(FeatureLevel::Level11_1));
        session.startup().unwrap();
        session.shutdown();
        session.shutdown();
        let destroys = session
            .platform()
            .calls
            .iter()
            .filter(|call| call.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 3);
    }
}
