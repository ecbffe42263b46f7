/// Frame type and backend trait.
pub mod backend;
/// CPU raster backend.
pub mod cpu;
/// Timeline frame loop.
pub mod pipeline;
pub(crate) mod text;
