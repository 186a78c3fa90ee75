pub mod config;
pub mod muxer;
pub mod repositories;
