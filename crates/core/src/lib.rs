//! Core library for the Dream Canvas generative art engine.
//!
//! The engine turns a snapshot of a user's dream journal into a
//! procedurally animated artwork. Each module owns one stage of the
//! pipeline: `fetch` pulls a bounded sample of records from the remote
//! dream API, `analysis` derives an immutable art configuration from
//! them, `render` paints the configured patterns onto a raster surface,
//! and `animate` paces the redraw loop. `export` persists rendered
//! frames as PNG files.

pub mod analysis;
pub mod animate;
pub mod config;
pub mod dream;
pub mod error;
pub mod export;
pub mod fetch;
pub mod render;

pub use analysis::{analyze, ArtConfig, ArtStyle, PatternFlags, Rgb, ThemeMatches};
pub use animate::{
    AnimationDriver, DriverState, FrameClock, FrameHandle, FrameOutcome, FrameScheduler,
    ManualScheduler, FRAME_BUDGET_MS,
};
pub use config::{ApiConfig, AppConfig, CanvasConfig};
pub use dream::DreamRecord;
pub use error::{DreamCanvasError, Result};
pub use export::{save_png, FrameExporter};
pub use fetch::{DreamFetcher, DreamIndexEntry, DreamIndexPage};
pub use render::{create_surface, render_frame, FrameContext, PatternKind, PointerState};
