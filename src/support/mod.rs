pub mod clock;
pub mod errors;
pub mod ids;
pub mod logging;
