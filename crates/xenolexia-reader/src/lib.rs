pub mod context;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod surface;

pub use context::context_window;
pub use error::PipelineError;
pub use markup::{escape_html, render_markup};
pub use pipeline::{ChapterPipeline, PreparedChapter, ProcessedChapter, WordMarker};
pub use progress::ProgressThrottle;
pub use session::{ReaderSession, SessionStats};
pub use surface::{ContentPayload, RenderSurface};
