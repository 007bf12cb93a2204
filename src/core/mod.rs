// src/core/mod.rs

pub mod color;
pub mod escape;
pub mod output;
pub mod template;
