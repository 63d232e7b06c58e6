//! FFI crate exposing the TaskNest core to the Flutter UI.

pub mod api;
