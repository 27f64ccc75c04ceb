// src/fetch/providers/mod.rs
pub mod gnews;
pub mod newsapi;
pub mod newsdata;
