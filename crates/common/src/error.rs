/// Errors that can stop the demo from starting or that reject a request.
///
/// Startup failures (surface, adapter, device) are fatal. `InvalidViewport`
/// is returned for degenerate resizes, which callers log and ignore.
#[derive(Debug, thiserror::Error)]
pub enum TumbleError {
    #[error("drawable surface not found: {0}")]
    SurfaceNotFound(String),
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(String),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("failed to create graphics device: {0}")]
    DeviceRequest(String),
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}
