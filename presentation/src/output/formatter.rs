//! Output formatter trait

use council_domain::DeliberationResult;

/// Trait for formatting deliberation results
pub trait OutputFormatter {
    /// Format the complete result (all three stages)
    fn format(&self, result: &DeliberationResult) -> String;

    /// Format as JSON, with the conversation title when one was generated
    fn format_json(&self, result: &DeliberationResult, title: Option<&str>) -> String;

    /// Format synthesis only (concise output)
    fn format_synthesis_only(&self, result: &DeliberationResult) -> String;
}
