//! Default values shared by settings and documentation

/// Default backend service locations (one service per capability)
pub mod endpoints {
    pub const DETECT_URL: &str = "http://127.0.0.1:8004";
    pub const DETECT_PATH: &str = "/predict-file";

    pub const REFINE_URL: &str = "http://127.0.0.1:8001";
    pub const REFINE_PATH: &str = "/refine";

    pub const SYNTHESIZE_URL: &str = "http://127.0.0.1:8002";
    pub const SYNTHESIZE_PATH: &str = "/tts";

    pub const TRANSCRIBE_URL: &str = "http://127.0.0.1:8003";
    pub const TRANSCRIBE_PATH: &str = "/transcribe";
}

/// Timeouts (in milliseconds)
pub mod timeouts {
    /// Detection runs once per frame and must keep up with the camera
    pub const DETECT_MS: u64 = 5_000;

    /// Refinement is an LLM round trip
    pub const REFINE_MS: u64 = 60_000;

    pub const SYNTHESIZE_MS: u64 = 30_000;

    pub const TRANSCRIBE_MS: u64 = 30_000;

    /// Upper bound accepted by validation
    pub const MAX_MS: u64 = 600_000;
}

/// Relay server defaults
pub mod server {
    pub const HOST: &str = "0.0.0.0";

    pub const PORT: u16 = 8000;

    /// Inbound units buffered per connection before the socket stops being read
    pub const INBOUND_QUEUE_CAPACITY: usize = 32;

    /// Largest accepted WebSocket message (frames and audio chunks)
    pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

    pub const MIN_MESSAGE_BYTES: usize = 1024;
}

/// Joins accumulated labels before refinement
pub const LABEL_SEPARATOR: &str = " ";
