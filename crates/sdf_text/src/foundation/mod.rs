//! Foundation utilities shared by the text pipeline

pub mod logging;
pub mod math;
