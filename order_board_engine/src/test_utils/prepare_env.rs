use log::*;

/// Sets up logging for a test. Safe to call from every test.
pub fn prepare_test_env() {
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}
