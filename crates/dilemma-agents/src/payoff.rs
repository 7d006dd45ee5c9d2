//! The 2x2 payoff table.
//!
//! [`PayoffMatrix`] maps `(own strategy, opponent strategy)` to the payoff
//! received by the first player. Both players of a game read the same
//! table from their own side, so `payoff(C, D)` is what a cooperator gets
//! against a defector and `payoff(D, C)` what the defector gets in the
//! same game.
//!
//! No ordering between the entries is assumed. The classic Prisoner's
//! Dilemma ordering `T > R > P > S` is only the default; Hawk-Dove, Stag
//! Hunt and degenerate tables run through the same code.

use dilemma_types::{PayoffSummary, Strategy};

use crate::error::AgentError;

/// Own-payoff table indexed by `(own, opponent)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PayoffMatrix {
    /// Cooperate vs Cooperate (reward).
    cc: f64,
    /// Cooperate vs Defect (sucker).
    cd: f64,
    /// Defect vs Cooperate (temptation).
    dc: f64,
    /// Defect vs Defect (punishment).
    dd: f64,
}

impl PayoffMatrix {
    /// Build a table from its four entries.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NonFinitePayoff`] naming the first entry that
    /// is infinite or NaN.
    pub fn new(cc: f64, cd: f64, dc: f64, dd: f64) -> Result<Self, AgentError> {
        for (entry, value) in [("cc", cc), ("cd", cd), ("dc", dc), ("dd", dd)] {
            if !value.is_finite() {
                return Err(AgentError::NonFinitePayoff { entry, value });
            }
        }
        Ok(Self { cc, cd, dc, dd })
    }

    /// The standard Prisoner's Dilemma table: R=3, S=0, T=5, P=1.
    pub const fn prisoners_dilemma() -> Self {
        Self {
            cc: 3.0,
            cd: 0.0,
            dc: 5.0,
            dd: 1.0,
        }
    }

    /// Hawk-Dove (snowdrift) table: R=3, S=1, T=4, P=0. Mutual defection
    /// is the worst outcome, so meeting a defector favors cooperating.
    pub const fn hawk_dove() -> Self {
        Self {
            cc: 3.0,
            cd: 1.0,
            dc: 4.0,
            dd: 0.0,
        }
    }

    /// Stag Hunt table: R=4, S=0, T=3, P=2. Mutual cooperation pays best
    /// but defecting is the safe choice.
    pub const fn stag_hunt() -> Self {
        Self {
            cc: 4.0,
            cd: 0.0,
            dc: 3.0,
            dd: 2.0,
        }
    }

    /// Payoff to a player using `own` against `opponent`.
    pub const fn payoff(&self, own: Strategy, opponent: Strategy) -> f64 {
        match (own, opponent) {
            (Strategy::Cooperate, Strategy::Cooperate) => self.cc,
            (Strategy::Cooperate, Strategy::Defect) => self.cd,
            (Strategy::Defect, Strategy::Cooperate) => self.dc,
            (Strategy::Defect, Strategy::Defect) => self.dd,
        }
    }

    /// Payoffs to both players of one game, `(first, second)`.
    pub const fn payoff_pair(&self, first: Strategy, second: Strategy) -> (f64, f64) {
        (self.payoff(first, second), self.payoff(second, first))
    }

    /// The entries under their classical names.
    pub const fn summary(&self) -> PayoffSummary {
        PayoffSummary {
            reward: self.cc,
            sucker: self.cd,
            temptation: self.dc,
            punishment: self.dd,
        }
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self::prisoners_dilemma()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Strategy = Strategy::Cooperate;
    const D: Strategy = Strategy::Defect;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < f64::EPSILON
    }

    #[test]
    fn lookup_covers_all_four_pairings() {
        let m = PayoffMatrix::new(3.0, 0.0, 5.0, 1.0).unwrap_or_default();
        assert!(close(m.payoff(C, C), 3.0));
        assert!(close(m.payoff(C, D), 0.0));
        assert!(close(m.payoff(D, C), 5.0));
        assert!(close(m.payoff(D, D), 1.0));
    }

    #[test]
    fn pair_returns_both_sides_of_one_game() {
        let m = PayoffMatrix::prisoners_dilemma();
        let (c_side, d_side) = m.payoff_pair(C, D);
        assert!(close(c_side, 0.0));
        assert!(close(d_side, 5.0));
    }

    #[test]
    fn arbitrary_orderings_are_accepted() {
        // Hawk-Dove style: mutual defection is the worst outcome.
        let m = PayoffMatrix::new(2.0, 1.0, 3.0, -4.0);
        assert!(m.is_ok());
        // Degenerate: every entry equal.
        assert!(PayoffMatrix::new(1.0, 1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn non_finite_entry_is_rejected_by_name() {
        let err = PayoffMatrix::new(3.0, f64::NAN, 5.0, 1.0);
        assert!(matches!(
            err,
            Err(AgentError::NonFinitePayoff { entry: "cd", .. })
        ));
        let err = PayoffMatrix::new(3.0, 0.0, 5.0, f64::INFINITY);
        assert!(matches!(
            err,
            Err(AgentError::NonFinitePayoff { entry: "dd", .. })
        ));
    }

    #[test]
    fn summary_names_entries() {
        let s = PayoffMatrix::prisoners_dilemma().summary();
        assert!(close(s.reward, 3.0));
        assert!(close(s.sucker, 0.0));
        assert!(close(s.temptation, 5.0));
        assert!(close(s.punishment, 1.0));
    }

    #[test]
    fn game_presets_have_their_characteristic_ordering() {
        let hd = PayoffMatrix::hawk_dove().summary();
        assert!(hd.temptation > hd.reward && hd.reward > hd.sucker);
        assert!(hd.sucker > hd.punishment);
        assert!(close(hd.sucker, 1.0));
        assert!(close(hd.punishment, 0.0));

        let sh = PayoffMatrix::stag_hunt().summary();
        assert!(sh.reward > sh.temptation && sh.temptation > sh.punishment);
        assert!(sh.punishment > sh.sucker);
        assert!(close(sh.reward, 4.0));
        assert!(close(sh.punishment, 2.0));
    }
}
