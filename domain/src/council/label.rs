//! Anonymous labels and the label ↔ model mapping.
//!
//! Raters in Stage 2 never see model names. Each successful Stage-1 answer
//! is shown as `Response A`, `Response B`, ... in council order, and the
//! [`AnonymizedSet`] keeps the way back.
//!
//! # Label scheme
//!
//! Labels use bijective base-26, the same scheme as spreadsheet columns:
//!
//! | Position | Label |
//! |----------|-------|
//! | 0..=25   | `A`..`Z` |
//! | 26, 27   | `AA`, `AB` |
//! | 51, 52   | `AZ`, `BA` |
//! | 701, 702 | `ZZ`, `AAA` |

use crate::core::model::Model;
use crate::council::response::ModelResponse;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Anonymous label for one Stage-1 answer (Value Object)
///
/// Ordering follows position: shorter labels first, then alphabetical, so
/// `Z < AA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// Label for the answer at `index` (0-based).
    pub fn from_index(index: usize) -> Self {
        let mut n = index + 1;
        let mut letters = Vec::new();
        while n > 0 {
            n -= 1;
            letters.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        letters.reverse();
        Self(letters.into_iter().map(char::from).collect())
    }

    /// Parse a label token such as `"C"` or `"AB"`.
    ///
    /// Only uppercase ASCII letters are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase()) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// 0-based position this label encodes.
    pub fn index(&self) -> usize {
        self.0
            .bytes()
            .fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1)
            - 1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token raters are asked to write, e.g. `Response C`.
    pub fn response_token(&self) -> String {
        format!("Response {}", self.0)
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Label {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Label::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid label: {s}")))
    }
}

/// One labeled Stage-1 answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizedResponse {
    pub label: Label,
    pub model: Model,
    pub text: String,
}

/// Bijective mapping between labels and the models that answered.
///
/// Built once per deliberation from the successful Stage-1 responses and
/// never regenerated; Stage 3 relies on it to de-anonymize Stage 2.
#[derive(Debug, Clone, Default)]
pub struct AnonymizedSet {
    entries: Vec<AnonymizedResponse>,
    by_label: HashMap<Label, usize>,
    by_model: HashMap<Model, usize>,
}

impl AnonymizedSet {
    /// Label the successful responses in the order given.
    ///
    /// Failed responses are skipped and never occupy a letter.
    pub fn from_responses(responses: &[ModelResponse]) -> Self {
        let mut set = Self::default();
        for response in responses {
            let Some(text) = response.text() else {
                continue;
            };
            if set.by_model.contains_key(response.model()) {
                continue;
            }
            let index = set.entries.len();
            let label = Label::from_index(index);
            set.by_label.insert(label.clone(), index);
            set.by_model.insert(response.model().clone(), index);
            set.entries.push(AnonymizedResponse {
                label,
                model: response.model().clone(),
                text: text.to_string(),
            });
        }
        set
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labeled answers in label order.
    pub fn entries(&self) -> &[AnonymizedResponse] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|e| &e.label)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.by_label.contains_key(label)
    }

    /// Position of `label` in council order, used for tie-breaking.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.by_label.get(label).copied()
    }

    pub fn model_for(&self, label: &Label) -> Option<&Model> {
        self.by_label.get(label).map(|&i| &self.entries[i].model)
    }

    pub fn label_for(&self, model: &Model) -> Option<&Label> {
        self.by_model.get(model).map(|&i| &self.entries[i].label)
    }

    /// Owned `label -> model` map for the result bundle.
    pub fn label_to_model(&self) -> BTreeMap<Label, Model> {
        self.entries
            .iter()
            .map(|e| (e.label.clone(), e.model.clone()))
            .collect()
    }

    /// Owned `model -> label` map.
    pub fn model_to_label(&self) -> BTreeMap<Model, Label> {
        self.entries
            .iter()
            .map(|e| (e.model.clone(), e.label.clone()))
            .collect()
    }
}
