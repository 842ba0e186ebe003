// src/handlers/mod.rs

pub mod widget;
