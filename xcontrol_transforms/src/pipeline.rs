// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An ordered chain of post-processing rules.

extern crate alloc;

use alloc::vec::Vec;

use crate::operator::PostProcessingRule;

/// An ordered list of post-processing rules, applied server-side in sequence.
///
/// Operator rules return `Option`; [`Pipeline::push_opt`] drops the ones that did not apply so
/// the serialized chain never contains holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    rules: Vec<PostProcessingRule>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: PostProcessingRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Appends a rule if present.
    pub fn push_opt(&mut self, rule: Option<PostProcessingRule>) -> &mut Self {
        if let Some(rule) = rule {
            self.rules.push(rule);
        }
        self
    }

    /// Returns the rules in order.
    pub fn rules(&self) -> &[PostProcessingRule] {
        &self.rules
    }

    /// Consumes the pipeline, returning its rules.
    pub fn into_rules(self) -> Vec<PostProcessingRule> {
        self.rules
    }
}

impl FromIterator<Option<PostProcessingRule>> for Pipeline {
    fn from_iter<T: IntoIterator<Item = Option<PostProcessingRule>>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn absent_rules_are_skipped() {
        let mut pipeline = Pipeline::new();
        pipeline
            .push_opt(None)
            .push(PostProcessingRule::Flatten)
            .push_opt(None);
        assert_eq!(pipeline.rules(), &[PostProcessingRule::Flatten]);

        let collected: Pipeline = [None, Some(PostProcessingRule::Flatten)].into_iter().collect();
        assert_eq!(collected.into_rules().len(), 1);
    }
}
