// Entry point: load configuration, bring up the session, pump messages,
// tear down. Startup failure exits with a non-zero status instead of
// continuing into the message loop with partial graphics state.

#[cfg(windows)]
use anyhow::Result;

use kindling::config::Config;

fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();
}

#[cfg(windows)]
fn main() -> Result<()> {
    use kindling::backend::{Win32Platform, WindowDesc};
    use kindling::Session;

    let config = Config::load();
    init_logging();
    log::info!(
        "Starting {}: {}x{} ({})",
        config.window.title,
        config.window.width,
        config.window.height,
        if config.window.fullscreen {
            "fullscreen"
        } else {
            "windowed"
        }
    );

    let debug_layer = cfg!(debug_assertions) && config.debug.debug_layer;
    let platform = Win32Platform::from_process(debug_layer)?;
    let mut session = Session::new(platform, WindowDesc::from(&config.window));

    // A failed startup has already rolled back whatever it created.
    if let Err(err) = session.startup() {
        log::error!("Startup failed: {err}");
        return Err(err.into());
    }

    // Teardown always runs, even when the loop errors out.
    let outcome = session.run();
    session.shutdown();
    outcome?;

    Ok(())
}

#[cfg(not(windows))]
fn main() {
    init_logging();
    let config = Config::load();
    log::error!(
        "{} requires Windows (Win32 + Direct3D11); nothing to run on this platform",
        config.window.title
    );
    std::process::exit(1);
}
