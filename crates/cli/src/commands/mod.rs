pub mod predict;
pub mod scenarios;
pub mod status;
