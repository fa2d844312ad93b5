//! Quorum rules: did enough participation happen in a phase?
//!
//! A rule is scoped to exactly one inquiry or one option and to one
//! phase. Evaluation is a pure function of the rule and observed counts.

use agora_types::{AgoraError, AgoraResult, InstanceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// How the threshold is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumKind {
    /// `actual >= total * threshold / 100`
    Percentage,
    /// `actual >= threshold`
    Absolute,
    /// `actual > total / 2`; threshold ignored
    Majority,
    /// Any unrecognised kind read from storage. Never reached.
    #[serde(other)]
    Unknown,
}

impl QuorumKind {
    /// Parse a stored kind name; unrecognised names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "percentage" => QuorumKind::Percentage,
            "absolute" => QuorumKind::Absolute,
            "majority" => QuorumKind::Majority,
            _ => QuorumKind::Unknown,
        }
    }
}

impl fmt::Display for QuorumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuorumKind::Percentage => "percentage",
            QuorumKind::Absolute => "absolute",
            QuorumKind::Majority => "majority",
            QuorumKind::Unknown => "unknown",
        })
    }
}

/// Which population the threshold is measured against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumBase {
    Total,
    Participants,
    Voters,
    Eligible,
}

impl FromStr for QuorumBase {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" => Ok(QuorumBase::Total),
            "participants" => Ok(QuorumBase::Participants),
            "voters" => Ok(QuorumBase::Voters),
            "eligible" => Ok(QuorumBase::Eligible),
            other => Err(AgoraError::validation(
                "base",
                format!("unknown quorum base `{}`", other),
            )),
        }
    }
}

/// Lifecycle phase a rule applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumPhase {
    Vote,
    Deliberation,
    Amendment,
    Final,
}

impl FromStr for QuorumPhase {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vote" => Ok(QuorumPhase::Vote),
            "deliberation" => Ok(QuorumPhase::Deliberation),
            "amendment" => Ok(QuorumPhase::Amendment),
            "final" => Ok(QuorumPhase::Final),
            other => Err(AgoraError::validation(
                "phase",
                format!("unknown quorum phase `{}`", other),
            )),
        }
    }
}

/// Owner of a rule: one inquiry or one option, never both.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumScope {
    Inquiry(InstanceId),
    InquiryOption(InstanceId),
}

/// A validated quorum rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuorumRule {
    pub scope: QuorumScope,
    pub phase: QuorumPhase,
    pub kind: QuorumKind,
    pub base: QuorumBase,
    pub threshold: f64,
}

/// Partial change to a rule. Unset fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuorumUpdate {
    pub phase: Option<QuorumPhase>,
    pub kind: Option<QuorumKind>,
    pub base: Option<QuorumBase>,
    pub threshold: Option<f64>,
}

impl QuorumUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, phase: QuorumPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_kind(mut self, kind: QuorumKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_base(mut self, base: QuorumBase) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

impl QuorumRule {
    /// Create a rule, rejecting invalid parameters.
    pub fn new(
        scope: QuorumScope,
        phase: QuorumPhase,
        kind: QuorumKind,
        base: QuorumBase,
        threshold: f64,
    ) -> AgoraResult<Self> {
        let rule = Self {
            scope,
            phase,
            kind,
            base,
            threshold,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Create a rule from stored names.
    pub fn parse(
        scope: QuorumScope,
        phase: &str,
        kind: &str,
        base: &str,
        threshold: f64,
    ) -> AgoraResult<Self> {
        Self::new(
            scope,
            phase.parse()?,
            QuorumKind::from_name(kind),
            base.parse()?,
            threshold,
        )
    }

    /// `kind` known, `threshold >= 0`, and `threshold <= 100` for percentages.
    pub fn validate(&self) -> AgoraResult<()> {
        if self.kind == QuorumKind::Unknown {
            return Err(AgoraError::validation("kind", "unknown quorum kind"));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(AgoraError::validation(
                "threshold",
                format!("threshold must be a non-negative number, got {}", self.threshold),
            ));
        }
        if self.kind == QuorumKind::Percentage && self.threshold > 100.0 {
            return Err(AgoraError::validation(
                "threshold",
                format!("percentage threshold must be at most 100, got {}", self.threshold),
            ));
        }
        Ok(())
    }

    /// Apply an update. The whole candidate is validated first; on error
    /// the rule is unchanged.
    pub fn apply(&mut self, update: &QuorumUpdate) -> AgoraResult<()> {
        let candidate = Self {
            scope: self.scope.clone(),
            phase: update.phase.unwrap_or(self.phase),
            kind: update.kind.unwrap_or(self.kind),
            base: update.base.unwrap_or(self.base),
            threshold: update.threshold.unwrap_or(self.threshold),
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

/// Observed population sizes for one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationCounts {
    pub total: u64,
    pub participants: u64,
    pub voters: u64,
    pub eligible: u64,
}

impl ParticipationCounts {
    /// The count a rule with this base is measured against.
    pub fn denominator(&self, base: QuorumBase) -> u64 {
        match base {
            QuorumBase::Total => self.total,
            QuorumBase::Participants => self.participants,
            QuorumBase::Voters => self.voters,
            QuorumBase::Eligible => self.eligible,
        }
    }
}

/// Decides whether quorum rules are met.
pub struct QuorumEvaluator;

impl QuorumEvaluator {
    /// Whether `actual` out of `total` meets `rule`.
    ///
    /// No population means no quorum. Ties count as reached for
    /// percentage and absolute rules; majority is strict.
    pub fn is_reached(rule: &QuorumRule, actual: u64, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        let reached = match rule.kind {
            QuorumKind::Percentage => percentage_reached(actual, total, rule.threshold),
            QuorumKind::Absolute => absolute_reached(actual, rule.threshold),
            QuorumKind::Majority => u128::from(actual) * 2 > u128::from(total),
            QuorumKind::Unknown => false,
        };
        trace!(
            kind = %rule.kind,
            threshold = rule.threshold,
            actual = actual,
            total = total,
            reached = reached,
            "Quorum evaluated"
        );
        reached
    }

    /// Evaluate against the population named by the rule's base.
    pub fn evaluate(rule: &QuorumRule, actual: u64, counts: &ParticipationCounts) -> bool {
        Self::is_reached(rule, actual, counts.denominator(rule.base))
    }

    /// Every rule of `phase` must pass. A phase without rules is reached.
    pub fn phase_reached(
        rules: &[QuorumRule],
        phase: QuorumPhase,
        actual: u64,
        counts: &ParticipationCounts,
    ) -> bool {
        rules
            .iter()
            .filter(|rule| rule.phase == phase)
            .all(|rule| Self::evaluate(rule, actual, counts))
    }
}

/// `actual * 100 >= total * threshold`, exact in integers when the
/// threshold is a whole percentage.
fn percentage_reached(actual: u64, total: u64, threshold: f64) -> bool {
    if threshold.fract() == 0.0 && (0.0..=100.0).contains(&threshold) {
        return u128::from(actual) * 100 >= u128::from(total) * threshold as u128;
    }
    actual as f64 * 100.0 >= total as f64 * threshold
}

/// `actual >= threshold`. Counts are whole, so the threshold rounds up.
fn absolute_reached(actual: u64, threshold: f64) -> bool {
    let needed = threshold.ceil();
    needed <= u64::MAX as f64 && u128::from(actual) >= needed as u128
}
