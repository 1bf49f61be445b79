//! Editing and synchronization engine for honeycomb diagrams: the graph
//! store, the interaction state machine, editing commands, the document
//! codec, navigation history, and background loading.

pub mod browse;
pub mod commands;
pub mod document;
pub mod error;
pub mod history;
pub mod ids;
pub mod interaction;
pub mod loader;
pub mod logging;
pub mod model;
pub mod session;
pub mod settings;
pub mod source;
pub mod store;
pub mod theme;
