//! Synthetic crop records for load testing.

use chrono::{Duration, Local, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::crop::{NewCrop, CROP_NAMES, GROWTH_STAGES, PEST_CONTROL_MEASURES};

pub const HARVEST_OFFSET_DAYS: std::ops::RangeInclusive<i64> = 60..=180;
pub const YIELD_RANGE_KG: std::ops::RangeInclusive<u32> = 500..=5000;
const PLANTING_WINDOW_MONTHS: u32 = 24;

/// Generate one crop record. Planting falls within the two years up to
/// `today`; harvest follows it by 60 to 180 days.
pub fn generate_crop<R: Rng>(rng: &mut R, today: NaiveDate) -> NewCrop {
    let earliest = today
        .checked_sub_months(Months::new(PLANTING_WINDOW_MONTHS))
        .unwrap_or(today);
    let span = (today - earliest).num_days();
    let planting_date = earliest + Duration::days(rng.random_range(0..=span));
    let harvest_date = planting_date + Duration::days(rng.random_range(HARVEST_OFFSET_DAYS));

    NewCrop {
        crop_name: pick(rng, &CROP_NAMES),
        planting_date,
        harvest_date,
        growth_stage: pick(rng, &GROWTH_STAGES),
        pest_control_measures: pick(rng, &PEST_CONTROL_MEASURES),
        yield_prediction: rng.random_range(YIELD_RANGE_KG),
    }
}

fn pick<R: Rng>(rng: &mut R, items: &[&str]) -> String {
    items[rng.random_range(0..items.len())].to_string()
}

/// Stateful generator holding its own random source.
///
/// A seeded generator produces the same sequence for the same seed and
/// `today`, which keeps load runs reproducible.
pub struct CropGenerator {
    rng: StdRng,
    today: NaiveDate,
}

impl CropGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            today: Local::now().date_naive(),
        }
    }

    pub fn seeded(seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
        }
    }

    pub fn next_crop(&mut self) -> NewCrop {
        generate_crop(&mut self.rng, self.today)
    }

    pub fn batch(&mut self, count: usize) -> Vec<NewCrop> {
        (0..count).map(|_| self.next_crop()).collect()
    }
}

impl Default for CropGenerator {
    fn default() -> Self {
        Self::new()
    }
}
