//! HTTP handlers

pub mod health;
pub mod predict;
pub mod model_info;

#[cfg(test)]
mod tests;
