//! Daily report pipeline for a single chat channel.
//!
//! [`ReportPipeline::run`] drives the stages in order; each stage is also
//! usable on its own.

pub mod activity_date;
mod error;
pub mod fetcher;
pub mod index_builder;
pub mod pipeline;
pub mod publisher;
mod report_store;
pub mod report_types;
pub mod synthesizer;
pub mod transcript;
pub mod user_directory;

pub use activity_date::{activity_date, is_iso_date};
pub use error::ReportError;
pub use fetcher::{retain_recent, MessageFetcher, MessageSource};
pub use index_builder::{scan_report_dates, IndexBuilder};
pub use pipeline::{PipelineConfig, ReportPipeline, RunOutcome, SavedReport};
pub use publisher::{
    render_notification, CommitStatus, NotificationConfig, Notifier, PublishSummary, Publisher,
    VersionControl,
};
pub use report_store::ReportStore;
pub use report_types::{AdviceEntry, ProjectProgress, Report, ReportIndex, UserReport};
pub use synthesizer::{parse_report, ReportSynthesizer, SynthesizerConfig};
pub use transcript::{format_transcript, Transcript};
pub use user_directory::{DirectoryUser, KnownProject, ResolvedIdentity, UserDirectory};
