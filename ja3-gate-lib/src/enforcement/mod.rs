pub mod decision;
pub mod engine;
pub mod mode;

pub use decision::{Decision, Rejection};
pub use engine::{annotate_headers, Ja3Engine};
pub use mode::EnforcementMode;
