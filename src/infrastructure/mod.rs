pub mod config;
pub mod sample;
pub mod storage;
pub mod vcs;
