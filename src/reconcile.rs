//! Scan-then-regenerate until every expected artifact exists or the attempt
//! budget runs out.

use crate::sink::ArtifactSink;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const NO_ERROR_MESSAGE: &str = "No error message available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingArtifact {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    /// Regeneration rounds that ran.
    pub attempts_used: u32,
    /// Empty on full success.
    pub missing: Vec<MissingArtifact>,
}

impl FinalReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

struct RetryState<'a> {
    expected: &'a IndexSet<String>,
    remaining_attempts: u32,
    last_error: BTreeMap<String, String>,
}

impl RetryState<'_> {
    /// Expected ids without an artifact, in expected order.
    fn scan(&self, sink: &dyn ArtifactSink) -> Vec<String> {
        let present = match sink.list_ids() {
            Ok(ids) => ids,
            Err(err) => {
                warn!("artifact listing failed, checking ids one by one: {err:#}");
                self.expected
                    .iter()
                    .filter(|id| sink.exists(id))
                    .cloned()
                    .collect()
            }
        };
        self.expected
            .iter()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect()
    }
}

/// Drives `generate` until `sink` holds an artifact for every id in
/// `expected`, for at most `max_attempts` regeneration rounds.
///
/// Each failed call overwrites the id's previous message, so the report
/// carries the most recent cause. The missing set in the report always comes
/// from one last scan after the budget is spent.
pub fn reconcile<F>(
    expected: &IndexSet<String>,
    sink: &dyn ArtifactSink,
    generate: F,
    max_attempts: u32,
) -> FinalReport
where
    F: FnMut(&str) -> Result<(), String>,
{
    reconcile_with_errors(expected, sink, generate, max_attempts, BTreeMap::new())
}

/// Like [`reconcile`], seeded with failure messages already known from an
/// earlier generation pass. A seeded message is reported for an id that is
/// still missing when no round produced a newer one.
pub fn reconcile_with_errors<F>(
    expected: &IndexSet<String>,
    sink: &dyn ArtifactSink,
    mut generate: F,
    max_attempts: u32,
    known_errors: BTreeMap<String, String>,
) -> FinalReport
where
    F: FnMut(&str) -> Result<(), String>,
{
    let mut state = RetryState {
        expected,
        remaining_attempts: max_attempts,
        last_error: known_errors,
    };
    let mut attempts_used = 0;

    loop {
        let missing = state.scan(sink);
        if missing.is_empty() {
            info!("all {} artifacts present after {} round(s)", expected.len(), attempts_used);
            return FinalReport {
                attempts_used,
                missing: Vec::new(),
            };
        }
        if state.remaining_attempts == 0 {
            break;
        }

        info!(
            "round {}/{}: regenerating {} missing artifact(s)",
            attempts_used + 1,
            max_attempts,
            missing.len()
        );
        for id in &missing {
            if let Err(msg) = generate(id) {
                state.last_error.insert(id.clone(), msg);
            }
        }
        state.remaining_attempts -= 1;
        attempts_used += 1;
    }

    let missing = state
        .scan(sink)
        .into_iter()
        .map(|id| {
            let message = state
                .last_error
                .get(&id)
                .cloned()
                .unwrap_or_else(|| NO_ERROR_MESSAGE.to_string());
            MissingArtifact { id, message }
        })
        .collect::<Vec<_>>();

    for m in &missing {
        warn!("no artifact for {} after {} attempt(s): {}", m.id, attempts_used, m.message);
    }

    FinalReport {
        attempts_used,
        missing,
    }
}
