//! Body metrics derived from a user profile.
//!
//! Everything here is a pure function of its arguments. Energy figures are in
//! kcal/day.

use strum::Display;

use crate::profile::Sex;

/// Multiplier applied to tiers that are not in the activity table.
const DEFAULT_ACTIVITY_FACTOR: f64 = 1.2;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

pub fn bmi(height_cm: u16, weight_kg: f64) -> f64 {
    let height_m = height_cm as f64 / 100.0;
    weight_kg / height_m.powf(2.0)
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Basal metabolic rate, Mifflin-St Jeor equation.
pub fn bmr(sex: Sex, age: u16, height_cm: u16, weight_kg: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm as f64 - 5.0 * age as f64;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

pub fn activity_factor(activity: u8) -> f64 {
    match activity {
        1 => 1.2,
        2 => 1.375,
        3 => 1.55,
        4 => 1.725,
        5 => 1.9,
        _ => DEFAULT_ACTIVITY_FACTOR,
    }
}

pub fn tdee(sex: Sex, age: u16, height_cm: u16, weight_kg: f64, activity: u8) -> f64 {
    bmr(sex, age, height_cm, weight_kg) * activity_factor(activity)
}

/// Daily intake suggested for losing weight.
///
/// Picks the larger of a 500 and a 300 kcal cut, which always resolves to the
/// 300 kcal one.
pub fn suggested_deficit_target(tdee: f64) -> f64 {
    f64::max(tdee - 500.0, tdee - 300.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyEstimate {
    pub tdee: f64,
    pub deficit_target: f64,
}

impl EnergyEstimate {
    pub fn new(sex: Sex, age: u16, height_cm: u16, weight_kg: f64, activity: u8) -> Self {
        let tdee = tdee(sex, age, height_cm, weight_kg, activity);
        Self {
            tdee,
            deficit_target: suggested_deficit_target(tdee),
        }
    }
}
