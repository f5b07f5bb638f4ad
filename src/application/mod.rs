pub mod bootstrap;
pub mod commands;
pub mod display;
pub mod ticker;
