//! Predicate composition registry.
//!
//! Independent parts of a screen (search box, id search, custom filters,
//! permanent scoping) each own a keyed fragment. [`PredicateRegistry::build`]
//! ANDs them into one predicate. Fragments are combined in key order, so the
//! same set of fragments always builds the same predicate whatever order they
//! were registered in.

use crate::error::FilterError;
use crate::filter::Predicate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Key of the fragment that is never removed by `clear_except`/`reset`.
pub const INIT_KEY: &str = "init";

/// What `build` does when a fragment builder fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentFailurePolicy {
    /// Skip the failing fragment and log it.
    #[default]
    Degrade,
    /// Abort the build with the fragment's error.
    FailFast,
}

/// Inputs shared by every fragment of one build.
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    pub entity_type: String,
}

impl FilterContext {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
        }
    }
}

type FragmentFn = dyn Fn(&FilterContext) -> Result<Predicate, FilterError> + Send + Sync;

/// A named, lazily built filter fragment.
#[derive(Clone)]
pub struct Fragment {
    builder: Arc<FragmentFn>,
}

impl Fragment {
    pub fn new<F>(builder: F) -> Self
    where
        F: Fn(&FilterContext) -> Result<Predicate, FilterError> + Send + Sync + 'static,
    {
        Self {
            builder: Arc::new(builder),
        }
    }

    /// Fragment that always yields `predicate`.
    pub fn fixed(predicate: Predicate) -> Self {
        Self::new(move |_| Ok(predicate.clone()))
    }

    pub fn build(&self, ctx: &FilterContext) -> Result<Predicate, FilterError> {
        (self.builder)(ctx)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment").finish_non_exhaustive()
    }
}

impl From<Predicate> for Fragment {
    fn from(predicate: Predicate) -> Self {
        Fragment::fixed(predicate)
    }
}

/// Keyed filter fragments for one screen.
#[derive(Debug, Clone)]
pub struct PredicateRegistry {
    fragments: BTreeMap<String, Fragment>,
    permanent: BTreeSet<String>,
    policy: FragmentFailurePolicy,
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateRegistry {
    pub fn new() -> Self {
        let mut permanent = BTreeSet::new();
        permanent.insert(INIT_KEY.to_string());
        Self {
            fragments: BTreeMap::new(),
            permanent,
            policy: FragmentFailurePolicy::default(),
        }
    }

    pub fn with_policy(policy: FragmentFailurePolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    pub fn policy(&self) -> FragmentFailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FragmentFailurePolicy) {
        self.policy = policy;
    }

    /// Insert or replace the fragment under `key`.
    pub fn put(&mut self, key: impl Into<String>, fragment: impl Into<Fragment>) {
        let key = key.into();
        tracing::trace!(key = %key, "Registering filter fragment");
        self.fragments.insert(key, fragment.into());
    }

    /// Insert a fragment and protect its key from `clear_except`/`reset`.
    pub fn put_permanent(&mut self, key: impl Into<String>, fragment: impl Into<Fragment>) {
        let key = key.into();
        self.permanent.insert(key.clone());
        self.put(key, fragment);
    }

    pub fn mark_permanent(&mut self, key: impl Into<String>) {
        self.permanent.insert(key.into());
    }

    /// Remove the fragment under `key`. No-op when absent.
    pub fn remove(&mut self, key: &str) -> bool {
        self.fragments.remove(key).is_some()
    }

    /// Remove every fragment whose key is neither in `keep` nor permanent.
    pub fn clear_except<I, S>(&mut self, keep: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: BTreeSet<String> = keep.into_iter().map(|k| k.as_ref().to_string()).collect();
        let permanent = &self.permanent;
        self.fragments
            .retain(|key, _| keep.contains(key) || permanent.contains(key));
    }

    /// Drop everything but the permanent fragments.
    pub fn reset(&mut self) {
        self.clear_except(std::iter::empty::<&str>());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fragments.contains_key(key)
    }

    pub fn is_permanent(&self, key: &str) -> bool {
        self.permanent.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// AND of every fragment, `Predicate::Always` when there are none.
    pub fn build(&self, ctx: &FilterContext) -> Result<Predicate, FilterError> {
        let mut parts = Vec::with_capacity(self.fragments.len());
        for (key, fragment) in &self.fragments {
            match fragment.build(ctx) {
                Ok(predicate) => parts.push(predicate),
                Err(err) => match self.policy {
                    FragmentFailurePolicy::Degrade => {
                        tracing::warn!(
                            key = %key,
                            entity_type = %ctx.entity_type,
                            error = %err,
                            "Skipping failed filter fragment"
                        );
                    }
                    FragmentFailurePolicy::FailFast => {
                        tracing::error!(key = %key, error = %err, "Filter fragment failed");
                        return Err(FilterError::FragmentFailed {
                            key: key.clone(),
                            reason: err.to_string(),
                        });
                    }
                },
            }
        }
        Ok(Predicate::and_all(parts))
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Registration order never changes the built predicate.
        #[test]
        fn prop_build_is_order_independent(
            entries in prop::collection::btree_map("[a-e]{1,3}", any::<i64>(), 0..8)
        ) {
            let pairs: Vec<(String, i64)> = entries.into_iter().collect();

            let mut forward = PredicateRegistry::new();
            for (k, v) in &pairs {
                forward.put(k.clone(), Predicate::equals(k.clone(), *v));
            }
            let mut backward = PredicateRegistry::new();
            for (k, v) in pairs.iter().rev() {
                backward.put(k.clone(), Predicate::equals(k.clone(), *v));
            }

            let ctx = FilterContext::new("Echo");
            prop_assert_eq!(forward.build(&ctx), backward.build(&ctx));
        }

        /// Re-putting the same fragments leaves the build unchanged.
        #[test]
        fn prop_put_is_idempotent(key in "[a-z]{1,5}", v in any::<i64>()) {
            let mut reg = PredicateRegistry::new();
            reg.put(key.clone(), Predicate::equals(key.clone(), v));
            let ctx = FilterContext::new("Echo");
            let once = reg.build(&ctx);
            reg.put(key.clone(), Predicate::equals(key.clone(), v));
            prop_assert_eq!(reg.len(), 1);
            prop_assert_eq!(reg.build(&ctx), once);
        }
    }
}
