
pub mod logging;
pub mod template;
pub mod config;
pub mod sysparams;
pub mod journal;
pub mod shell;
pub mod stages;
pub mod particles;
pub mod mrc;
pub mod micrograph;
pub mod grid;

mod rand;
