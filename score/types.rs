// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One line of evidence linking a target to a disease with a numeric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub target_id: String,
    pub disease_id: String,
    pub score: f64,
}

impl Evidence {
    pub fn new(target_id: impl Into<String>, disease_id: impl Into<String>, score: f64) -> Self {
        Self {
            target_id: target_id.into(),
            disease_id: disease_id.into(),
            score,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.target_id.clone(), self.disease_id.clone())
    }
}

/// The grouping key for evidence. Both ids are compared field by field, so
/// `("AB", "C")` and `("A", "BC")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub target_id: String,
    pub disease_id: String,
}

impl PairKey {
    pub fn new(target_id: impl Into<String>, disease_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            disease_id: disease_id.into(),
        }
    }

    /// Natural ordering on (target, disease), so "T2" sorts before "T10".
    /// Ids that natural order cannot tell apart fall back to byte order, so
    /// distinct keys never compare equal.
    pub fn natural_cmp(&self, other: &Self) -> std::cmp::Ordering {
        natural_id_cmp(&self.target_id, &other.target_id)
            .then_with(|| natural_id_cmp(&self.disease_id, &other.disease_id))
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.target_id, self.disease_id)
    }
}

/// Natural order on ids with a byte-order tiebreak. `natord` skips whitespace,
/// so "T 1" and "T1" would otherwise be equal.
pub fn natural_id_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    natord::compare(a, b).then_with(|| a.cmp(b))
}

/// The per-(target, disease) aggregate: median of all evidence scores plus the
/// highest `top_n` scores in descending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composite {
    pub target_id: String,
    pub disease_id: String,
    pub median_score: f64,
    pub top_scores: Vec<f64>,
}

impl Composite {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.target_id.clone(), self.disease_id.clone())
    }
}

/// A record that is addressed by a unique string id in its reference table.
pub trait Keyed {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub id: String,
    pub approved_symbol: String,
}

impl Keyed for TargetRef {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRef {
    pub id: String,
    pub name: String,
}

impl Keyed for DiseaseRef {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A composite enriched with the target's approved symbol and the disease name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub target_id: String,
    pub disease_id: String,
    pub median_score: f64,
    pub top_scores: Vec<f64>,
    pub approved_symbol: String,
    pub disease_name: String,
}

/// Two distinct targets and the diseases they share.
///
/// `shared_diseases` is ordered so the serialized form is stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapPair {
    pub target_a: String,
    pub target_b: String,
    pub shared_diseases: BTreeSet<String>,
}

impl OverlapPair {
    /// True when this pair names the same two targets as `other`, in either order.
    pub fn same_targets(&self, other: &Self) -> bool {
        (self.target_a == other.target_a && self.target_b == other.target_b)
            || (self.target_a == other.target_b && self.target_b == other.target_a)
    }
}

/// A cooperative cancellation signal shared between the caller and parallel workers.
///
/// Workers only poll it between units of work (evidence groups, search cells).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
