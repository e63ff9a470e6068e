//! Reference site adapters.

pub mod jsjobbs;
pub mod producthunt;

pub use jsjobbs::JsJobbs;
pub use producthunt::ProductHunt;
