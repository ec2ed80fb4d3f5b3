pub mod browser;
pub mod detail;
pub mod events;
