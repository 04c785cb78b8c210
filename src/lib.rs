pub mod logging;
pub mod reticle;
