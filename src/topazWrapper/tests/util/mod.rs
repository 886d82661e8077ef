
#![allow(unused)]

pub mod cmd;
pub mod fixtures;
pub mod work_dir;
