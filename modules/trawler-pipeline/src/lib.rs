pub mod backfill;
pub mod controller;
pub mod cursor;
pub mod enrich;
pub mod pager;
pub mod profiles;
pub mod queue;
pub mod relabel;
pub mod sink;
pub mod source;
pub mod stats;
pub mod window;

pub use backfill::{Backfill, BackfillSettings};
pub use controller::{ControllerState, PipelineController, TrawlSettings};
pub use cursor::CursorStore;
pub use enrich::enrich;
pub use pager::{PageOutcome, PageTarget, Pager, PassMode};
pub use profiles::ProfileResolver;
pub use queue::BackpressureQueue;
pub use relabel::{relabel_all, LabelWriter};
pub use sink::{KafkaSink, PostgresSink, ProfileStore, RecordSink};
pub use source::CommentSource;
pub use stats::TrawlStats;
pub use window::SlidingWindowCache;
