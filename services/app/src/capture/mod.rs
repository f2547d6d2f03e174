pub mod flow;
pub mod session;

pub use flow::{capture_process, CaptureOutcome};
pub use session::{CapturePhase, CaptureSession};
