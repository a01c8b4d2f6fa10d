//! Confidence scoring for qualifying phases.
//!
//! Base phase score plus independent additive terms; every auxiliary input
//! is optional and absence contributes 0, never a penalty. The result is
//! clamped to [0, 100].

use crate::models::{EarningsSnapshot, Phase, PriceContext};

const BASE_CROSSOVER: i32 = 50;
const BASE_APPROACHING: i32 = 30;

const SCORE_BUY_RATIO_STRONG: i32 = 15;
const SCORE_UPSIDE_STRONG: i32 = 10;
const SCORE_EARNINGS_SAFE: i32 = 10;
const PENALTY_EARNINGS_IMMINENT: i32 = -15;
const SCORE_ABOVE_50MA: i32 = 5;
const SCORE_VOLUME_ABOVE_AVG: i32 = 10;

const BUY_RATIO_STRONG: f64 = 0.70;
const UPSIDE_STRONG_PCT: f64 = 15.0;
const EARNINGS_SAFE_DAYS: i64 = 14;
const EARNINGS_IMMINENT_DAYS: i64 = 7;

/// Score a qualifying phase with whatever auxiliary context is available.
pub fn confidence_score(
    phase: Phase,
    earnings: Option<&EarningsSnapshot>,
    price: Option<&PriceContext>,
) -> u8 {
    let mut score = match phase {
        Phase::Buy | Phase::Sell => BASE_CROSSOVER,
        Phase::ApproachingBuy | Phase::ApproachingSell => BASE_APPROACHING,
        Phase::Neutral => 0,
    };

    if let Some(earnings) = earnings {
        if earnings.buy_ratio.is_some_and(|r| r > BUY_RATIO_STRONG) {
            score += SCORE_BUY_RATIO_STRONG;
        }
        if earnings
            .upside_to_target_pct
            .is_some_and(|u| u > UPSIDE_STRONG_PCT)
        {
            score += SCORE_UPSIDE_STRONG;
        }
        // Same field feeds both terms; mutually exclusive by construction.
        if let Some(days_out) = earnings.days_until_earnings {
            if days_out > EARNINGS_SAFE_DAYS {
                score += SCORE_EARNINGS_SAFE;
            } else if days_out <= EARNINGS_IMMINENT_DAYS {
                score += PENALTY_EARNINGS_IMMINENT;
            }
        }
    }

    if let Some(price) = price {
        if price.ma_50d.is_some_and(|ma| price.close > ma) {
            score += SCORE_ABOVE_50MA;
        }
        if price
            .volume_5d_avg
            .is_some_and(|avg| avg > 0.0 && price.volume > avg)
        {
            score += SCORE_VOLUME_ABOVE_AVG;
        }
    }

    score.clamp(0, 100) as u8
}
