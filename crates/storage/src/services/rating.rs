//! Elo-style rating updates from race results.
//!
//! A runner's realised performance blends how close they finished to the winning
//! time with where they placed. It is compared to a logistic expectation centred
//! on the field's average rating, scaled by a rating-damped K-factor, nudged by
//! how far the runner beat (or missed) their rating-implied placing, and applied
//! on top of an inactivity decay of the pre-race rating.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CompetitionType;

const SECONDS_PER_MONTH: f64 = 30.0 * 24.0 * 60.0 * 60.0;

/// Tunable constants of the rating model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// K-factor before competition weighting and rating damping
    pub k_factor_base: f64,
    /// Rating gap that moves the expectation by a factor of ten
    pub expectation_spread: f64,
    /// Steepness of the exponential penalty on the gap to the best time
    pub time_decay: f64,
    pub time_weight: f64,
    pub placement_weight: f64,
    /// Monthly multiplier applied to inactive ratings
    pub base_decay_rate: f64,
    /// Floor for the inactivity multiplier
    pub min_decay_factor: f64,
    /// Rating at which the K-factor is halved
    pub k_pivot_rating: f64,
    pub k_pivot_scale: f64,
    /// Rating points per place beaten relative to the rating-implied placing
    pub rank_bonus: f64,
    /// Largest gain or loss a single competition may produce
    pub max_delta: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor_base: 20.0,
            expectation_spread: 400.0,
            time_decay: 4.0,
            time_weight: 0.8,
            placement_weight: 0.2,
            base_decay_rate: 0.95,
            min_decay_factor: 0.7,
            k_pivot_rating: 1500.0,
            k_pivot_scale: 300.0,
            rank_bonus: 0.3,
            max_delta: 50.0,
        }
    }
}

/// One participant as seen before the competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingInput {
    pub id: i64,
    pub rating: f64,
    /// Finish time; all participants must share one unit
    pub time: f64,
    /// Finish placing; derived from times unless every participant supplies one
    #[serde(default)]
    pub rank: Option<u32>,
    pub last_active_date: NaiveDateTime,
}

/// Result of a rating pass for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingOutcome {
    pub id: i64,
    pub rating: f64,
    pub time: f64,
    pub rank: u32,
    pub last_active_date: NaiveDateTime,
    pub expected: f64,
    pub performance_score: f64,
    pub predicted_rank: u32,
    pub decay_factor: f64,
    pub delta: i32,
    pub new_rating: f64,
}

/// Competition-wide inputs of a rating pass
#[derive(Debug, Clone, Copy)]
pub struct RatingContext {
    pub competition_type: CompetitionType,
    /// Reference instant for inactivity decay
    pub today: NaiveDateTime,
    /// Participant whose presence penalises everyone finishing behind them
    pub special_runner_id: Option<i64>,
}

impl RatingContext {
    pub fn new(competition_type: CompetitionType, today: NaiveDateTime) -> Self {
        Self {
            competition_type,
            today,
            special_runner_id: None,
        }
    }

    pub fn with_special_runner(mut self, runner_id: Option<i64>) -> Self {
        self.special_runner_id = runner_id;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingCalculator {
    config: RatingConfig,
}

impl RatingCalculator {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Compute one outcome per participant, in input order.
    ///
    /// Only timed runners (positive finite time) form the field. Untimed runners
    /// are placed after it and keep their rating. Fewer than two timed runners
    /// yields a neutral pass: every delta is zero and every new rating equals the
    /// current one.
    pub fn calculate(&self, runners: &[RatingInput], context: &RatingContext) -> Vec<RatingOutcome> {
        let ranks = finish_ranks(runners);
        let predicted_ranks = rating_ranks(runners);
        let count = timed_count(runners);

        let Some(best_time) = best_time(runners).filter(|_| count >= 2) else {
            return runners
                .iter()
                .zip(ranks.iter().zip(predicted_ranks.iter()))
                .map(|(runner, (&rank, &predicted_rank))| neutral_outcome(runner, rank, predicted_rank))
                .collect();
        };

        let average_rating = runners
            .iter()
            .filter(|runner| is_timed(runner.time))
            .map(|runner| runner.rating)
            .sum::<f64>()
            / count as f64;
        let coefficient = context.competition_type.coefficient();
        let special_rank = context
            .special_runner_id
            .and_then(|special_id| {
                runners
                    .iter()
                    .position(|runner| runner.id == special_id && is_timed(runner.time))
            })
            .map(|index| ranks[index]);

        runners
            .iter()
            .zip(ranks.iter().zip(predicted_ranks.iter()))
            .map(|(runner, (&rank, &predicted_rank))| {
                if !is_timed(runner.time) {
                    return neutral_outcome(runner, rank, predicted_rank);
                }

                let expected = self.expected_score(runner.rating, average_rating);
                let performance = self.time_weight_score(runner.time, best_time)
                    + self.config.placement_weight * placement_score(rank, count);
                let decay_factor = self.decay_factor(runner.last_active_date, context.today);
                let k_factor = self.k_factor(runner.rating, coefficient);

                let mut delta = k_factor * (performance - expected);
                delta += (i64::from(predicted_rank) - i64::from(rank)) as f64 * self.config.rank_bonus;

                let beaten_by_special = special_rank.is_some_and(|special| rank > special);
                if beaten_by_special {
                    delta = delta.min(0.0) - k_factor * expected;
                }

                let mut delta =
                    round_half_up(delta.clamp(-self.config.max_delta, self.config.max_delta)) as i32;
                if beaten_by_special {
                    delta = delta.min(-1);
                }

                RatingOutcome {
                    id: runner.id,
                    rating: runner.rating,
                    time: runner.time,
                    rank,
                    last_active_date: runner.last_active_date,
                    expected: round_to(expected, 3),
                    performance_score: round_to(performance, 3),
                    predicted_rank,
                    decay_factor,
                    delta,
                    new_rating: round_half_up(runner.rating * decay_factor + f64::from(delta)),
                }
            })
            .collect()
    }

    /// Logistic win expectation against the field average
    pub fn expected_score(&self, rating: f64, average_rating: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((average_rating - rating) / self.config.expectation_spread))
    }

    /// 1.0 for the best time, decaying exponentially with the relative gap to it
    pub fn time_performance(&self, time: f64, best_time: f64) -> f64 {
        (-self.config.time_decay * (time - best_time) / best_time).exp()
    }

    fn time_weight_score(&self, time: f64, best_time: f64) -> f64 {
        self.config.time_weight * self.time_performance(time, best_time)
    }

    /// Inactivity multiplier in `[min_decay_factor, 1.0]`
    pub fn decay_factor(&self, last_active_date: NaiveDateTime, today: NaiveDateTime) -> f64 {
        let months_inactive =
            ((today - last_active_date).num_seconds() as f64 / SECONDS_PER_MONTH).max(0.0);

        self.config
            .base_decay_rate
            .powf(months_inactive)
            .max(self.config.min_decay_factor)
            .min(1.0)
    }

    /// K-factor damped by a sigmoid around the pivot rating
    pub fn k_factor(&self, rating: f64, coefficient: f64) -> f64 {
        let damping =
            1.0 / (1.0 + ((rating - self.config.k_pivot_rating) / self.config.k_pivot_scale).exp());
        self.config.k_factor_base * coefficient * damping
    }
}

/// A finish time counts only when it is a positive finite number; 0 marks an untimed entry
pub fn is_timed(time: f64) -> bool {
    time.is_finite() && time > 0.0
}

fn timed_count(runners: &[RatingInput]) -> usize {
    runners.iter().filter(|runner| is_timed(runner.time)).count()
}

/// Fastest usable finish time
pub fn best_time(runners: &[RatingInput]) -> Option<f64> {
    runners
        .iter()
        .map(|runner| runner.time)
        .filter(|&time| is_timed(time))
        .reduce(f64::min)
}

/// Whether a field can produce meaningful rating changes
pub fn is_ratable(runners: &[RatingInput]) -> bool {
    timed_count(runners) >= 2
}

/// 1.0 for first place, 0.0 for last
pub fn placement_score(rank: u32, count: usize) -> f64 {
    if count < 2 {
        return 1.0;
    }
    let count = count as f64;
    ((count - f64::from(rank)) / (count - 1.0)).clamp(0.0, 1.0)
}

/// Finish placings: supplied ranks when every participant has one, otherwise by
/// ascending time with equal times sharing a placing. Untimed runners share the
/// placing after the last timed one.
pub fn finish_ranks(runners: &[RatingInput]) -> Vec<u32> {
    if let Some(supplied) = runners.iter().map(|runner| runner.rank).collect::<Option<Vec<_>>>() {
        return supplied;
    }

    let timed: Vec<f64> = runners
        .iter()
        .map(|runner| runner.time)
        .filter(|&time| is_timed(time))
        .collect();

    runners
        .iter()
        .map(|runner| {
            let ahead = if is_timed(runner.time) {
                timed.iter().filter(|&&time| time < runner.time).count()
            } else {
                timed.len()
            };
            1 + ahead as u32
        })
        .collect()
}

/// Placings implied by current ratings among timed runners, highest first, equal
/// ratings sharing a placing
pub fn rating_ranks(runners: &[RatingInput]) -> Vec<u32> {
    runners
        .iter()
        .map(|runner| {
            1 + runners
                .iter()
                .filter(|other| is_timed(other.time) && other.rating > runner.rating)
                .count() as u32
        })
        .collect()
}

fn neutral_outcome(runner: &RatingInput, rank: u32, predicted_rank: u32) -> RatingOutcome {
    RatingOutcome {
        id: runner.id,
        rating: runner.rating,
        time: runner.time,
        rank,
        last_active_date: runner.last_active_date,
        expected: 0.0,
        performance_score: 0.0,
        predicted_rank,
        decay_factor: 1.0,
        delta: 0,
        new_rating: runner.rating,
    }
}

/// Nearest integer with halves rounded toward positive infinity (-2.5 becomes -2)
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
