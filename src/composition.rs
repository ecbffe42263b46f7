/// Page rendering recipe and the visual layers it composes into.
pub mod compositor;
/// Layout variants and per-page geometry.
pub mod layout;
pub mod model;
/// Concatenation of page clips.
pub mod timeline;
