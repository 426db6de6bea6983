//! Round and cascade pass results handed to the presentation layer

use serde::{Deserialize, Serialize};

use crate::config::WinTierThresholds;
use crate::credits::Credits;
use crate::grid::{Grid, Position};
use crate::paytable::WinEvent;

/// Cascade engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round in progress; accepts a start request
    Idle,
    /// Bet debited, board being filled
    Spinning,
    /// Board waiting to be scored
    Evaluating,
    /// Winners being removed and the board refilled
    Tumbling,
    /// Round paid out, feature transitions being applied
    Resolved,
}

/// How a round was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundKind {
    /// Base game round paid with the current bet
    Paid,
    /// Free spin (1-based index within the feature)
    FreeSpin { index: u32 },
    /// Bought feature; plays as the first free spin
    BuyFeature,
}

impl RoundKind {
    pub fn is_free_spin(&self) -> bool {
        !matches!(self, RoundKind::Paid)
    }
}

/// Free spins awarded when a round resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureAward {
    /// Scatters started free spins from the base game
    Triggered { spins: u32 },
    /// Scatters during free spins added spins
    Retriggered { spins: u32 },
}

/// Celebration bracket by win/bet ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WinTier {
    Win,
    BigWin,
    MegaWin,
    GigaWin,
}

impl WinTier {
    /// `None` for a zero win
    pub fn classify(win: Credits, bet: Credits, thresholds: &WinTierThresholds) -> Option<Self> {
        if win.is_zero() {
            return None;
        }
        let ratio = win.ratio_to(bet);
        let tier = if ratio >= thresholds.giga_win {
            WinTier::GigaWin
        } else if ratio >= thresholds.mega_win {
            WinTier::MegaWin
        } else if ratio >= thresholds.big_win {
            WinTier::BigWin
        } else {
            WinTier::Win
        };
        Some(tier)
    }
}

/// What a resolved round did to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSettlement {
    /// Amount debited at round start (bet, buy price, or zero)
    pub cost: Credits,
    /// Sum of all pass wins, after the max-win cap
    pub total_win: Credits,
    pub balance_before: Credits,
    pub balance_after: Credits,
    /// Multiplier values collected, in order
    pub multipliers: Vec<u32>,
    /// Scatters on the freshly spun board
    ///
    /// Trigger and retrigger are decided from this count alone, whether or
    /// not the first pass won; boards produced by tumbles are never checked.
    pub scatter_count: usize,
    pub feature: Option<FeatureAward>,
    pub free_spins_remaining: u32,
    /// This round used up the last free spin
    pub free_spins_ended: bool,
    pub free_spins_total_win: Credits,
    pub win_tier: Option<WinTier>,
    /// The max-win cap stopped the chain
    pub capped: bool,
    /// The pass limit stopped the chain
    pub pass_limit_hit: bool,
}

/// One evaluate (and, on a win, tumble) step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadePass {
    /// 1-based pass number within the round
    pub index: u32,
    /// Board as evaluated
    pub grid: Grid,
    pub wins: Vec<WinEvent>,
    /// Cells removed before the refill, column-major
    pub removed: Vec<Position>,
    /// Multiplier values collected by this pass's tumble
    pub multipliers_collected: Vec<u32>,
    /// Round multiplier this pass was paid with
    pub multiplier: u32,
    /// Amount credited to the round by this pass
    pub pass_win: Credits,
    /// Board after gravity refill; `None` when nothing was removed
    pub refilled: Option<Grid>,
    /// The round resolved on this pass
    pub resolved: bool,
    /// Present on the resolving pass
    pub settlement: Option<RoundSettlement>,
}

impl CascadePass {
    pub fn is_win(&self) -> bool {
        !self.wins.is_empty()
    }
}

/// A complete round computed eagerly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Round ID
    pub round_id: String,
    pub kind: RoundKind,
    pub bet: Credits,
    /// Every pass in order; the last one is the resolving pass
    pub passes: Vec<CascadePass>,
    pub settlement: RoundSettlement,
}

impl RoundOutcome {
    pub fn total_win(&self) -> Credits {
        self.settlement.total_win
    }

    pub fn is_win(&self) -> bool {
        !self.settlement.total_win.is_zero()
    }

    /// Number of winning passes (tumbles)
    pub fn cascade_count(&self) -> usize {
        self.passes.iter().filter(|p| p.is_win()).count()
    }

    /// Board the round started with
    pub fn initial_grid(&self) -> &Grid {
        &self.passes[0].grid
    }

    /// Board the round ended with
    pub fn final_grid(&self) -> &Grid {
        let last = &self.passes[self.passes.len() - 1];
        last.refilled.as_ref().unwrap_or(&last.grid)
    }

    pub fn win_ratio(&self) -> f64 {
        self.settlement.total_win.ratio_to(self.bet)
    }
}
