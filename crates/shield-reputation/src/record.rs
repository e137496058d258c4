use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Maximum number of history entries retained per account.
pub const MAX_HISTORY: usize = 50;

/// Reputation score categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Volume and quality of past transactions.
    TransactionHistory,
    /// Participation in community programs.
    CommunityParticipation,
    /// Identity verification standing; exempt from decay.
    VerificationLevel,
    /// Account age.
    Longevity,
    /// Breadth of on-chain activity.
    NetworkActivity,
    /// Participation in governance votes.
    GovernanceParticipation,
}

impl Category {
    /// All categories.
    pub fn all() -> [Category; 6] {
        [
            Self::TransactionHistory,
            Self::CommunityParticipation,
            Self::VerificationLevel,
            Self::Longevity,
            Self::NetworkActivity,
            Self::GovernanceParticipation,
        ]
    }

    /// Seed score for a freshly registered account.
    pub fn default_score(&self) -> u8 {
        match self {
            Self::VerificationLevel => 0,
            Self::Longevity => 10,
            _ => 50,
        }
    }

    /// Whether this category is reduced by scheduled decay.
    pub fn decays(&self) -> bool {
        !matches!(self, Self::VerificationLevel)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionHistory => write!(f, "TransactionHistory"),
            Self::CommunityParticipation => write!(f, "CommunityParticipation"),
            Self::VerificationLevel => write!(f, "VerificationLevel"),
            Self::Longevity => write!(f, "Longevity"),
            Self::NetworkActivity => write!(f, "NetworkActivity"),
            Self::GovernanceParticipation => write!(f, "GovernanceParticipation"),
        }
    }
}

/// One category's contribution to the overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Current score (0-100).
    pub score: u8,
    /// Weight in the overall aggregation (0-100).
    pub weight: u8,
    /// When the category was last written.
    pub last_updated: DateTime<Utc>,
}

/// One entry in the bounded score history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Overall score after the change.
    pub score: u8,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied reason for the change.
    pub reason: String,
}

/// Compound decay of a score over whole elapsed periods.
///
/// Each period retains `(100 - decay_rate)` percent, floored by integer
/// division. The same function backs the mutating decay pass and the pure
/// decayed read, so the two can never disagree.
pub fn decayed_score(score: u8, decay_rate: u8, periods: u64) -> u8 {
    if decay_rate == 0 || periods == 0 {
        return score;
    }
    let retain = (100 - decay_rate.min(100)) as u64;
    let mut value = score as u64;
    for _ in 0..periods {
        if value == 0 {
            break;
        }
        value = value * retain / 100;
    }
    value as u8
}

/// Whole decay periods elapsed between two instants.
pub fn elapsed_periods(
    last_decay_update: DateTime<Utc>,
    now: DateTime<Utc>,
    decay_period_secs: u64,
) -> u64 {
    if decay_period_secs == 0 {
        return 0;
    }
    let elapsed = (now - last_decay_update).num_seconds();
    if elapsed <= 0 {
        return 0;
    }
    elapsed as u64 / decay_period_secs
}

/// Per-account reputation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationRecord {
    /// Weighted aggregate of the category scores (0-100).
    pub overall_score: u8,
    /// Per-category scores and weights.
    pub categories: HashMap<Category, CategoryScore>,
    /// Bounded history of overall-score changes, oldest evicted first.
    pub history: VecDeque<HistoryEntry>,
    /// Per-period decay percentage (0-100).
    pub decay_rate: u8,
    /// When decay was last applied.
    pub last_decay_update: DateTime<Utc>,
}

impl ReputationRecord {
    /// Weighted mean of the given category scores; 0 when no weight.
    pub fn weighted_overall(categories: &HashMap<Category, CategoryScore>) -> u8 {
        let total_weight: u64 = categories.values().map(|c| c.weight as u64).sum();
        if total_weight == 0 {
            return 0;
        }
        let weighted_sum: u64 = categories
            .values()
            .map(|c| c.score as u64 * c.weight as u64)
            .sum();
        (weighted_sum / total_weight) as u8
    }

    /// Append a history entry, evicting the oldest at capacity.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    /// Apply pending decay in place and advance `last_decay_update`.
    ///
    /// Returns `true` if at least one whole period had elapsed. Does not
    /// append a history entry.
    pub fn apply_decay(&mut self, now: DateTime<Utc>, decay_period_secs: u64) -> bool {
        let periods = elapsed_periods(self.last_decay_update, now, decay_period_secs);
        if periods == 0 {
            return false;
        }
        for (category, entry) in self.categories.iter_mut() {
            if category.decays() {
                entry.score = decayed_score(entry.score, self.decay_rate, periods);
            }
        }
        self.overall_score = Self::weighted_overall(&self.categories);
        self.last_decay_update = now;
        true
    }

    /// The overall score as it would read after pending decay, without
    /// persisting anything.
    pub fn decayed_overall(&self, now: DateTime<Utc>, decay_period_secs: u64) -> u8 {
        let periods = elapsed_periods(self.last_decay_update, now, decay_period_secs);
        if periods == 0 {
            return self.overall_score;
        }
        let decayed: HashMap<Category, CategoryScore> = self
            .categories
            .iter()
            .map(|(category, entry)| {
                let score = if category.decays() {
                    decayed_score(entry.score, self.decay_rate, periods)
                } else {
                    entry.score
                };
                (
                    *category,
                    CategoryScore {
                        score,
                        weight: entry.weight,
                        last_updated: entry.last_updated,
                    },
                )
            })
            .collect();
        Self::weighted_overall(&decayed)
    }

    /// One category's score as it would read after pending decay.
    pub fn decayed_category(
        &self,
        category: Category,
        now: DateTime<Utc>,
        decay_period_secs: u64,
    ) -> Option<u8> {
        let entry = self.categories.get(&category)?;
        if !category.decays() {
            return Some(entry.score);
        }
        let periods = elapsed_periods(self.last_decay_update, now, decay_period_secs);
        Some(decayed_score(entry.score, self.decay_rate, periods))
    }
}
