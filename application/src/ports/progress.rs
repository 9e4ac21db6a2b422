//! Progress notification port
//!
//! Defines the interface for reporting progress during a deliberation.

use council_domain::{Model, Stage};

/// Callback for progress updates during a deliberation
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize);

    /// Called when one model call within a stage finishes
    fn on_task_complete(&self, stage: &Stage, model: &Model, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &Stage);

    // ==================== Model Stream Callbacks ====================

    /// Called when the chairman starts streaming its synthesis.
    fn on_model_stream_start(&self, _model: &Model) {}

    /// Called for each text chunk of the synthesis.
    fn on_model_stream_chunk(&self, _model: &Model, _chunk: &str) {}

    /// Called when the synthesis stream ends.
    fn on_model_stream_end(&self, _model: &Model) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: &Stage, _model: &Model, _success: bool) {}
    fn on_stage_complete(&self, _stage: &Stage) {}
}
