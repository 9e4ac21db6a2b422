//! Progress reporting for council deliberations

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{Model, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one indicatif bar per stage
///
/// While the chairman streams, the Stage 3 bar turns into a spinner showing
/// how much text has arrived.
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
    streamed_chars: Mutex<usize>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(ProgressDrawTarget::stderr()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            stage_bar: Mutex::new(None),
            streamed_chars: Mutex::new(0),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stream_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn short_name(stage: &Stage) -> &'static str {
        match stage {
            Stage::Responses => "Stage 1",
            Stage::Rankings => "Stage 2",
            Stage::Synthesis => "Stage 3",
        }
    }

    fn streamed(&self) -> usize {
        self.streamed_chars.lock().map(|n| *n).unwrap_or(0)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage.display_name().to_string());
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.stage_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_task_complete(&self, _stage: &Stage, model: &Model, success: bool) {
        let Ok(slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &Stage) {
        let Ok(mut slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            pb.finish_with_message(format!("{} complete!", Self::short_name(stage).green()));
        }
    }

    fn on_model_stream_start(&self, model: &Model) {
        if let Ok(mut n) = self.streamed_chars.lock() {
            *n = 0;
        }
        let Ok(slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            pb.set_style(Self::stream_style());
            pb.set_message(format!("{} is writing...", model));
        }
    }

    fn on_model_stream_chunk(&self, model: &Model, chunk: &str) {
        let total = match self.streamed_chars.lock() {
            Ok(mut n) => {
                *n += chunk.chars().count();
                *n
            }
            Err(_) => return,
        };
        let Ok(slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            pb.set_message(format!("{} is writing... {} chars", model, total));
        }
    }

    fn on_model_stream_end(&self, model: &Model) {
        let total = self.streamed();
        let Ok(slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            pb.set_style(Self::stage_style());
            pb.set_message(format!("{} finished ({} chars)", model, total));
        }
    }
}

/// Simple line-based progress for non-interactive stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage.display_name().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: &Stage, model: &Model, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {
        eprintln!();
    }
}
