// src/models/mod.rs

pub mod item;
pub mod kind;
