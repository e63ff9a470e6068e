pub mod registry;
pub mod session;
pub mod sites;

pub use registry::{ClientSettings, default_registry};
pub use session::{RetryPolicy, RotatingSession, SessionConfig, TransportMode};
pub use sites::{JsJobbs, ProductHunt};
