#![allow(clippy::needless_pass_by_value)]

pub mod init;
pub mod plugins;
pub mod run;
