pub mod allocate;
pub mod setup;
pub mod strategies;
pub mod ui;
