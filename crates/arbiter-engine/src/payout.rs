//! Stake and XP redistribution for decided content.
//!
//! Pools, in stake units:
//! - `reward_pool = price * reward_pool_fraction`
//! - `active_pool = reward_pool * active_pool_fraction`
//! - `passive_pool = reward_pool * passive_pool_fraction`
//!
//! Minority voters lose `victory_factor` of their stake. The majority splits
//! `active_pool + penalties` pro rata by stake; passive stakers split the
//! passive pool pro rata by stake, or, when there are none, the majority
//! splits it evenly.
//!
//! Every division floors, so the sum of payouts never exceeds the pools.
//! The residue is reported as `unallocated`.

use arbiter_core::constants::SCALE;
use arbiter_core::content::{ContentTypeConfig, XpConfig};
use arbiter_core::error::{ArithmeticError, EngineError};
use arbiter_core::fixed::{apply_fraction, checked_add, checked_sub, checked_sum, mul_div_floor, ratio};
use arbiter_core::types::{
    ModerationResult, Participant, PayoutEntry, PayoutResult, PayoutRole, PayoutSummary,
    PenaltyEntry, TallySnapshot, VoteChoice,
};

/// Reward pools converted to stake units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pools {
    pub active: u128,
    pub passive: u128,
}

impl Pools {
    pub fn compute(economics: &ContentTypeConfig, tally: &TallySnapshot) -> Result<Self, ArithmeticError> {
        let reward_pool = apply_fraction(tally.mint_price_reference, economics.reward_pool_fraction)?;
        let active = apply_fraction(reward_pool, economics.active_pool_fraction)?;
        let passive = apply_fraction(reward_pool, economics.passive_pool_fraction)?;
        Ok(Self {
            active: tally.to_stake_units(active)?,
            passive: tally.to_stake_units(passive)?,
        })
    }
}

/// Blend of head-count share `1 / count` and stake share, both scaled.
///
/// With zero total stake the stake share falls back to the head-count share.
pub fn hybrid_weight(count: usize, stake: u128, total_stake: u128) -> Result<u128, ArithmeticError> {
    let democratic = ratio(1, count as u128)?;
    let plutocratic = if total_stake == 0 {
        democratic
    } else {
        ratio(stake, total_stake)?
    };
    Ok((democratic + plutocratic) / 2)
}

/// `floor(base_xp * weight / SCALE)` as an XP amount.
fn xp_from_weight(base_xp: u64, weight: u128) -> Result<u64, ArithmeticError> {
    let xp = mul_div_floor(base_xp as u128, weight, SCALE)?;
    u64::try_from(xp).map_err(|_| ArithmeticError::Overflow)
}

/// Majority XP: hybrid weight boosted by `(SCALE + vf) / SCALE`.
pub fn majority_xp(xp: &XpConfig, weight: u128, victory_factor: u128) -> Result<u64, ArithmeticError> {
    let boosted = apply_fraction(weight, checked_add(SCALE, victory_factor)?)?;
    xp_from_weight(xp.base_xp, boosted)
}

/// Minority XP: hybrid weight reduced by `(SCALE - vf) / SCALE` and the
/// minority factor.
pub fn minority_xp(xp: &XpConfig, weight: u128, victory_factor: u128) -> Result<u64, ArithmeticError> {
    let reduced = apply_fraction(weight, SCALE.saturating_sub(victory_factor))?;
    xp_from_weight(xp.base_xp, apply_fraction(reduced, xp.minority_factor)?)
}

/// Passive XP: stake share scaled by the passive factor.
pub fn passive_xp(xp: &XpConfig, stake_share: u128) -> Result<u64, ArithmeticError> {
    xp_from_weight(xp.base_xp, apply_fraction(stake_share, xp.passive_factor)?)
}

/// `amount * stake / total`, or an even split when the group holds no stake.
fn pro_rata(amount: u128, stake: u128, total_stake: u128, count: usize) -> Result<u128, ArithmeticError> {
    if total_stake == 0 {
        mul_div_floor(amount, 1, count as u128)
    } else {
        mul_div_floor(amount, stake, total_stake)
    }
}

fn stake_of(group: &[&Participant]) -> Result<u128, ArithmeticError> {
    checked_sum(group.iter().map(|p| p.stake))
}

fn sum_xp(values: impl IntoIterator<Item = u64>) -> Result<u64, ArithmeticError> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v).ok_or(ArithmeticError::Overflow))
}

/// Redistribute stake and XP according to a decided `decision`.
///
/// Returns an empty result when the decision is not final. Active
/// participants whose vote differs from the winner (including a missing
/// vote) are the minority. Non-monetized content and decisions with no
/// majority recipient extract no stake; XP is awarded regardless.
///
/// The penalty pool is the sum of the floored per-member penalties rather
/// than `floor(vf * minority_stake / SCALE)`, so it can fall short of the
/// aggregate formula by less than one unit per minority member. What is
/// paid out never exceeds what was extracted.
pub fn settle(
    economics: &ContentTypeConfig,
    xp: &XpConfig,
    decision: &ModerationResult,
    tally: &TallySnapshot,
    active: &[Participant],
    passive: &[Participant],
) -> Result<PayoutResult, EngineError> {
    let winner = match (decision.is_final(), decision.winner) {
        (true, Some(w)) => w,
        _ => return Ok(PayoutResult::empty(decision.status)),
    };
    let vf = decision.victory_factor;

    let pools = if economics.is_monetized() {
        Pools::compute(economics, tally)?
    } else {
        Pools::default()
    };

    let (majority, minority): (Vec<&Participant>, Vec<&Participant>) = active
        .iter()
        .partition(|p| is_majority(p, winner));
    let majority_stake = stake_of(&majority)?;
    let minority_stake = stake_of(&minority)?;
    let passive_refs: Vec<&Participant> = passive.iter().collect();
    let passive_stake = stake_of(&passive_refs)?;

    let extract_stake = economics.is_monetized() && !majority.is_empty();

    let mut penalties = Vec::with_capacity(minority.len());
    for p in &minority {
        let amount = if extract_stake { apply_fraction(p.stake, vf)? } else { 0 };
        let weight = hybrid_weight(minority.len(), p.stake, minority_stake)?;
        penalties.push(PenaltyEntry {
            address: p.address.clone(),
            amount,
            xp_delta: minority_xp(xp, weight, vf)?,
        });
    }
    let penalty_pool = checked_sum(penalties.iter().map(|e| e.amount))?;

    let passive_redistributed = passive.is_empty();
    let majority_pool = checked_add(pools.active, penalty_pool)?;
    let even_bonus = if passive_redistributed && !majority.is_empty() {
        pools.passive / majority.len() as u128
    } else {
        0
    };

    let mut payouts = Vec::with_capacity(majority.len() + passive.len());
    for p in &majority {
        let share = pro_rata(majority_pool, p.stake, majority_stake, majority.len())?;
        let weight = hybrid_weight(majority.len(), p.stake, majority_stake)?;
        payouts.push(PayoutEntry {
            address: p.address.clone(),
            role: PayoutRole::Majority,
            amount: checked_add(share, even_bonus)?,
            xp_delta: majority_xp(xp, weight, vf)?,
        });
    }
    for p in &passive_refs {
        let amount = pro_rata(pools.passive, p.stake, passive_stake, passive.len())?;
        let stake_share = if passive_stake == 0 {
            ratio(1, passive.len() as u128)?
        } else {
            ratio(p.stake, passive_stake)?
        };
        payouts.push(PayoutEntry {
            address: p.address.clone(),
            role: PayoutRole::Passive,
            amount,
            xp_delta: passive_xp(xp, stake_share)?,
        });
    }

    let total_paid = checked_sum(payouts.iter().map(|e| e.amount))?;
    let total_pools = checked_add(majority_pool, pools.passive)?;
    let unallocated = checked_sub(total_pools, total_paid)?;
    let total_xp = sum_xp(
        payouts
            .iter()
            .map(|e| e.xp_delta)
            .chain(penalties.iter().map(|e| e.xp_delta)),
    )?;

    Ok(PayoutResult {
        status: decision.status,
        winner: Some(winner),
        payouts,
        penalties,
        summary: PayoutSummary {
            total_paid,
            total_penalties: penalty_pool,
            active_pool: pools.active,
            passive_pool: pools.passive,
            penalty_pool_from_minority: penalty_pool,
            victory_factor: vf,
            passive_redistributed,
            unallocated,
            total_xp,
        },
    })
}

/// Whether a participant backed `winner`.
pub fn is_majority(participant: &Participant, winner: VoteChoice) -> bool {
    participant.vote_choice == Some(winner)
}
