/// Frames processed per event when the configuration does not say
pub const DEFAULT_FRAMES_PER_EVENT: usize = 1;
/// Sleep between non-blocking sweeps while the coordinator waits for confirmations
pub const DEFAULT_SHUTDOWN_POLL_INTERVAL_MS: u64 = 1;
/// Layer name selecting the built-in synthetic facility/detector
pub const SIMULATED_LAYER: &str = "simulated";
