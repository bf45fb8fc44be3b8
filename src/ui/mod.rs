pub mod navigation;
pub mod readiness;
