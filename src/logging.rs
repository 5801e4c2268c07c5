#[allow(unused_imports)]
use log::info;


pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Warn).expect(
                "Couldn't initialize logger");
        } else {
            // try_init so tests and embedders that already installed a
            // logger don't panic here
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info")
            ).try_init();
        }
    }
}


// Progress lines for the viewer. On the web the default level is Warn,
// so route these through warn! to keep them visible in the console.
pub fn printlog(log_str: &str) {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            log::warn!("{}", log_str);
        } else {
            info!("{}", log_str);
        }
    }
}
