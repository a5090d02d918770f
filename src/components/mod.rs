//! Reusable view components.

pub mod dag;
