#![doc = include_str!("../README.md")]

pub mod timer;
pub mod workload;
pub mod driver;
