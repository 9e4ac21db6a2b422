//! Prompt templates for the three council stages

use crate::core::model::Model;
use crate::council::aggregate::{AggregateEntry, MeanRank};
use crate::council::label::{AnonymizedResponse, Label};
use crate::council::result::RankingSubmission;
use std::collections::BTreeMap;

/// Templates for generating prompts at each stage
pub struct CouncilPrompt;

impl CouncilPrompt {
    /// Stage 1: the question as every council member receives it
    pub fn initial_query(question: &str) -> String {
        format!(
            r#"Please answer the following question:

{}

Provide a clear, well-structured response."#,
            question
        )
    }

    /// Stage 2: anonymized answers plus the ranking instructions.
    ///
    /// Only the labels in `responses` appear; model names never do.
    pub fn ranking_prompt(question: &str, responses: &[AnonymizedResponse]) -> String {
        let responses_text = responses
            .iter()
            .map(|r| format!("{}:\n{}", r.label.response_token(), r.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let example: Vec<String> = responses
            .iter()
            .rev()
            .enumerate()
            .map(|(i, r)| format!("{}. {}", i + 1, r.label.response_token()))
            .collect();

        let remarks = [
            "provides good detail on X but misses Y",
            "is accurate but lacks depth on Z",
        ];
        let commentary: Vec<String> = responses
            .iter()
            .zip(remarks)
            .map(|(r, remark)| format!("{} {}...", r.label.response_token(), remark))
            .collect();

        format!(
            r#"You are evaluating different responses to the following question:

Question: {question}

Here are the responses from different models (anonymized):

{responses_text}

Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your reply, provide a final ranking.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "FINAL RANKING:" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section, and write nothing after it

Example of the correct format for your ENTIRE reply:

{commentary}

FINAL RANKING:
{example}

Now provide your evaluation and ranking:"#,
            commentary = commentary.join("\n"),
            example = example.join("\n"),
        )
    }

    /// Stage 3: everything, de-anonymized, for the chairman.
    ///
    /// With no rankings the peer-review sections are left out.
    pub fn synthesis_prompt(
        question: &str,
        responses: &[(Model, String)],
        rankings: &[RankingSubmission],
        label_to_model: &BTreeMap<Label, Model>,
        aggregate: &[AggregateEntry],
    ) -> String {
        let mut prompt = format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have answered a user's question, and then ranked each other's answers.

Original question: {}

STAGE 1 - Individual responses:
"#,
            question
        );

        for (model, text) in responses {
            prompt.push_str(&format!("\nModel: {}\nResponse: {}\n", model, text));
        }

        if !rankings.is_empty() {
            prompt.push_str("\nSTAGE 2 - Peer rankings:\n");
            prompt.push_str("Raters saw the answers anonymized as:\n");
            for (label, model) in label_to_model {
                prompt.push_str(&format!("- {} = {}\n", label.response_token(), model));
            }
            for submission in rankings {
                let order = submission
                    .deanonymized(label_to_model)
                    .iter()
                    .enumerate()
                    .map(|(i, m)| format!("{}. {}", i + 1, m))
                    .collect::<Vec<_>>()
                    .join("\n");
                prompt.push_str(&format!(
                    "\nRanked by {}:\n{}\nParsed order:\n{}\n",
                    submission.rater,
                    submission.raw_text,
                    if order.is_empty() { "(none)".to_string() } else { order }
                ));
            }
        }

        if !aggregate.is_empty() {
            prompt.push_str("\nAggregate ranking (lower mean rank is better):\n");
            for (i, entry) in aggregate.iter().enumerate() {
                let votes = match entry.mean_rank {
                    MeanRank::Ranked(_) => format!("votes: {}", entry.vote_count),
                    MeanRank::Unranked => "no votes".to_string(),
                };
                prompt.push_str(&format!(
                    "{}. {} (mean rank {}, {})\n",
                    i + 1,
                    entry.model,
                    entry.mean_rank,
                    votes
                ));
            }
        }

        prompt.push_str(
            r#"
Your task as Chairman is to synthesize all of this into a single, comprehensive, accurate answer to the original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#,
        );

        prompt
    }

    /// Short title for a conversation opened with `question`
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {}

Title:"#,
            question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::label::AnonymizedSet;
    use crate::council::parsing::ParseStrategy;
    use crate::council::response::ModelResponse;

    fn model(id: &str) -> Model {
        Model::new(id).unwrap()
    }

    fn set_of(ids: &[&str]) -> AnonymizedSet {
        let responses: Vec<ModelResponse> = ids
            .iter()
            .map(|id| ModelResponse::success(model(id), format!("answer from {id}")))
            .collect();
        AnonymizedSet::from_responses(&responses)
    }

    #[test]
    fn test_initial_query_format() {
        let prompt = CouncilPrompt::initial_query("What is Rust?");
        assert!(prompt.contains("What is Rust?"));
    }

    #[test]
    fn test_ranking_prompt_is_anonymous() {
        let set = set_of(&["vendor/alpha", "vendor/beta"]);
        let prompt = CouncilPrompt::ranking_prompt("What is Rust?", set.entries());

        assert!(prompt.contains("Response A:\nanswer from vendor/alpha"));
        assert!(prompt.contains("Response B:\nanswer from vendor/beta"));
        assert!(!prompt.contains("Response C"));
        assert!(prompt.contains("FINAL RANKING:"));
        assert!(prompt.contains("1. Response B\n2. Response A"));

        // Model names only appear inside the answer bodies.
        let without_bodies = prompt
            .replace("answer from vendor/alpha", "")
            .replace("answer from vendor/beta", "");
        assert!(!without_bodies.contains("vendor/"));
    }

    #[test]
    fn test_ranking_prompt_with_single_survivor() {
        let set = set_of(&["vendor/alpha"]);
        let prompt = CouncilPrompt::ranking_prompt("What is Rust?", set.entries());

        assert!(prompt.contains("Response A provides good detail"));
        assert!(prompt.contains("FINAL RANKING:\n1. Response A\n"));
        assert!(!prompt.contains("Response B"));
    }

    #[test]
    fn test_synthesis_prompt_deanonymizes() {
        let set = set_of(&["vendor/alpha", "vendor/beta"]);
        let submissions = vec![RankingSubmission {
            rater: model("vendor/alpha"),
            raw_text: "Response B is better.\nFINAL RANKING:\n1. Response B\n2. Response A".to_string(),
            parsed_order: vec![Label::from_index(1), Label::from_index(0)],
            parse_strategy: ParseStrategy::Strict,
        }];
        let aggregate = vec![
            AggregateEntry {
                label: Label::from_index(1),
                model: model("vendor/beta"),
                mean_rank: MeanRank::Ranked(1.0),
                vote_count: 1,
            },
            AggregateEntry {
                label: Label::from_index(0),
                model: model("vendor/alpha"),
                mean_rank: MeanRank::Ranked(2.0),
                vote_count: 1,
            },
        ];
        let responses = vec![
            (model("vendor/alpha"), "a".to_string()),
            (model("vendor/beta"), "b".to_string()),
        ];

        let prompt = CouncilPrompt::synthesis_prompt(
            "Q?",
            &responses,
            &submissions,
            &set.label_to_model(),
            &aggregate,
        );

        assert!(prompt.contains("Model: vendor/alpha\nResponse: a"));
        assert!(prompt.contains("Ranked by vendor/alpha"));
        assert!(prompt.contains("- Response B = vendor/beta"));
        assert!(prompt.contains("1. vendor/beta\n2. vendor/alpha"));
        assert!(prompt.contains("1. vendor/beta (mean rank 1.00, votes: 1)"));
    }

    #[test]
    fn test_synthesis_prompt_without_rankings() {
        let responses = vec![(model("vendor/alpha"), "a".to_string())];
        let prompt =
            CouncilPrompt::synthesis_prompt("Q?", &responses, &[], &BTreeMap::new(), &[]);
        assert!(prompt.contains("Model: vendor/alpha"));
        assert!(!prompt.contains("STAGE 2"));
        assert!(!prompt.contains("Aggregate ranking"));
    }

    #[test]
    fn test_title_prompt() {
        let prompt = CouncilPrompt::title_prompt("How do tides work?");
        assert!(prompt.contains("How do tides work?"));
        assert!(prompt.contains("3-5 words"));
    }
}
