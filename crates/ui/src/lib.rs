pub mod constants;
pub mod gesture;
pub mod theme;
pub mod transport;
