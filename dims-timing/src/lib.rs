pub mod cancel;
pub mod timer;

pub use cancel::{CancellationToken, Deadline, ResponseListener};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
