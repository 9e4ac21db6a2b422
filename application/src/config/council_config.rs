//! Council membership, validated once at construction.

use super::execution_params::ExecutionParams;
use council_domain::{DomainError, Model};
use std::collections::HashSet;
use std::sync::Arc;

/// Immutable description of one council.
///
/// The council order decides label assignment and tie-breaking. Raters
/// default to the full council, including members that fail in Stage 1.
#[derive(Debug, Clone)]
pub struct CouncilConfig {
    council: Arc<[Model]>,
    synthesis_model: Model,
    raters: Option<Arc<[Model]>>,
    params: ExecutionParams,
}

impl CouncilConfig {
    /// Rejects an empty council and duplicate members.
    pub fn new(council: Vec<Model>, synthesis_model: Model) -> Result<Self, DomainError> {
        validate_members(&council)?;
        Ok(Self {
            council: council.into(),
            synthesis_model,
            raters: None,
            params: ExecutionParams::default(),
        })
    }

    /// Use a dedicated rater list for Stage 2.
    pub fn with_raters(mut self, raters: Vec<Model>) -> Result<Self, DomainError> {
        validate_members(&raters)?;
        self.raters = Some(raters.into());
        Ok(self)
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn council(&self) -> &[Model] {
        &self.council
    }

    /// Models asked to rank in Stage 2.
    pub fn raters(&self) -> &[Model] {
        self.raters.as_deref().unwrap_or(&self.council)
    }

    pub fn synthesis_model(&self) -> &Model {
        &self.synthesis_model
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            council: Model::default_council().into(),
            synthesis_model: Model::default_chairman(),
            raters: None,
            params: ExecutionParams::default(),
        }
    }
}

fn validate_members(models: &[Model]) -> Result<(), DomainError> {
    if models.is_empty() {
        return Err(DomainError::NoModels);
    }
    let mut seen = HashSet::new();
    for model in models {
        if !seen.insert(model) {
            return Err(DomainError::DuplicateModel(model.to_string()));
        }
    }
    Ok(())
}
