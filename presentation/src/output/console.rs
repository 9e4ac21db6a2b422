//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{
    AggregateEntry, DeliberationResult, MeanRank, ModelResponse, ParseStrategy,
    RankingSubmission, Stage, Synthesis,
};

/// Formats deliberation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(result: &DeliberationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            result.question.content()
        ));

        let council: Vec<&str> = result.stage1.iter().map(|r| r.model().as_str()).collect();
        output.push_str(&format!(
            "{} {}\n",
            "Council:".cyan().bold(),
            council.join(", ")
        ));

        // Stage 1
        output.push_str(&Self::section_header(Stage::Responses.display_name()));
        for response in &result.stage1 {
            output.push_str(&Self::format_response(response));
        }

        // Stage 2
        output.push_str(&Self::section_header(Stage::Rankings.display_name()));
        if result.stage2.is_empty() {
            output.push_str(&format!("\n{}\n", "No peer rankings were produced.".dimmed()));
        }
        for submission in &result.stage2.rankings {
            output.push_str(&Self::format_submission(submission, result));
        }
        for failure in &result.stage2.failures {
            output.push_str(&format!(
                "\n{} {} {}\n",
                "x".red(),
                failure.rater.to_string().red().bold(),
                format!("({})", failure.error).dimmed()
            ));
        }
        if !result.stage2.aggregate.is_empty() {
            output.push_str(&format!("\n{}\n", "Aggregate Ranking:".cyan().bold()));
            output.push_str(&Self::format_aggregate(&result.stage2.aggregate));
        }

        // Stage 3
        output.push_str(&Self::section_header(Stage::Synthesis.display_name()));
        match &result.stage3 {
            Synthesis::Completed { model, text } => {
                output.push_str(&format!(
                    "\n{}\n\n{}\n",
                    format!("Chairman: {}", model).yellow().bold(),
                    text
                ));
            }
            Synthesis::Failed { model, error } => {
                output.push_str(&format!(
                    "\n{}\n{} {}\n",
                    format!("Chairman: {}", model).red().bold(),
                    "Synthesis failed:".red(),
                    error
                ));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &DeliberationResult, title: Option<&str>) -> String {
        let mut value = match serde_json::to_value(result) {
            Ok(value) => value,
            Err(_) => return "{}".to_string(),
        };
        if let (Some(title), Some(object)) = (title, value.as_object_mut()) {
            object.insert(
                "title".to_string(),
                serde_json::Value::String(title.to_string()),
            );
        }
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(result: &DeliberationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));

        output.push_str(&format!(
            "{} {}\n\n",
            "Q:".bold(),
            result.question.content()
        ));

        let answered: Vec<&str> = result
            .successful_responses()
            .map(|r| r.model().as_str())
            .collect();
        output.push_str(&format!(
            "{} {}\n",
            "Models consulted:".dimmed(),
            answered.join(", ")
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            "Chairman:".dimmed(),
            result.stage3.model()
        ));

        match &result.stage3 {
            Synthesis::Completed { text, .. } => output.push_str(text),
            Synthesis::Failed { error, .. } => {
                output.push_str(&format!("{} {}", "Synthesis failed:".red().bold(), error));
            }
        }
        output.push('\n');

        output
    }

    /// Force colors on or off for everything this crate prints
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Title line printed above human-readable output
    pub fn format_title(title: &str) -> String {
        format!("{} {}\n", "Title:".cyan().bold(), title.bold())
    }

    fn format_response(response: &ModelResponse) -> String {
        match (response.text(), response.error()) {
            (Some(text), _) => format!(
                "\n{}\n{}\n",
                format!("── {} ──", response.model()).yellow().bold(),
                text
            ),
            (None, Some(error)) => format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", response.model()).red().bold(),
                error
            ),
            (None, None) => String::new(),
        }
    }

    fn format_submission(submission: &RankingSubmission, result: &DeliberationResult) -> String {
        let mut output = format!(
            "\n{}\n{}\n",
            format!("── Ranked by {} ──", submission.rater).yellow().bold(),
            submission.raw_text.trim_end()
        );

        let order = submission.deanonymized(&result.stage2.label_to_model);
        if order.is_empty() {
            output.push_str(&format!("{}\n", "No ranking could be extracted.".dimmed()));
        } else {
            let listed: Vec<String> = order
                .iter()
                .enumerate()
                .map(|(i, model)| format!("{}. {}", i + 1, model))
                .collect();
            output.push_str(&format!(
                "{} {}\n",
                "Parsed order:".cyan(),
                listed.join(", ")
            ));
        }

        if submission.parse_strategy.is_fallback() {
            output.push_str(&format!(
                "{}\n",
                format!(
                    "(recovered without a FINAL RANKING list: {})",
                    Self::strategy_name(submission.parse_strategy)
                )
                .dimmed()
            ));
        }

        output
    }

    fn format_aggregate(entries: &[AggregateEntry]) -> String {
        let width = entries
            .iter()
            .map(|e| e.model.as_str().chars().count())
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let rank = match entry.mean_rank {
                MeanRank::Ranked(_) => format!("mean rank {}", entry.mean_rank),
                MeanRank::Unranked => "unranked".to_string(),
            };
            let votes = match entry.vote_count {
                1 => "1 vote".to_string(),
                n => format!("{} votes", n),
            };
            output.push_str(&format!(
                "  {}. {:<width$}  {}  ({})\n",
                i + 1,
                entry.model.as_str(),
                rank,
                votes,
                width = width
            ));
        }
        output
    }

    fn strategy_name(strategy: ParseStrategy) -> &'static str {
        match strategy {
            ParseStrategy::Strict => "strict",
            ParseStrategy::SectionScan => "section scan",
            ParseStrategy::FullTextScan => "full-text scan",
            ParseStrategy::None => "none",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &DeliberationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &DeliberationResult, title: Option<&str>) -> String {
        Self::format_json(result, title)
    }

    fn format_synthesis_only(&self, result: &DeliberationResult) -> String {
        Self::format_synthesis_only(result)
    }
}
