//! UI components.

pub mod mood_scene;
