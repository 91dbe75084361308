//! Route handlers

pub mod failure;
pub mod service;
