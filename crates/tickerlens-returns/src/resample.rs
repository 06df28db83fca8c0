//! Calendar-year resampling of a daily price series.
//!
//! Each observation is assigned to the bucket of its calendar year. Within a
//! bucket the first price is taken from the earliest date and the last price
//! from the latest date, regardless of the order the observations arrive in.

use crate::series::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First and last observed price within one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearBucket {
    /// Calendar year
    pub year: i32,
    /// Date of the earliest observation in the year
    pub first_date: NaiveDate,
    /// Price at the earliest observation
    pub first_price: f64,
    /// Date of the latest observation in the year
    pub last_date: NaiveDate,
    /// Price at the latest observation
    pub last_price: f64,
    /// Number of observations that fell into the year
    pub observations: usize,
}

impl YearBucket {
    fn open(point: &PricePoint) -> Self {
        Self {
            year: point.year(),
            first_date: point.date,
            first_price: point.price,
            last_date: point.date,
            last_price: point.price,
            observations: 1,
        }
    }

    // Ties keep the earliest input position for `first` and the latest for `last`.
    fn absorb(&mut self, point: &PricePoint) {
        if point.date < self.first_date {
            self.first_date = point.date;
            self.first_price = point.price;
        }
        if point.date >= self.last_date {
            self.last_date = point.date;
            self.last_price = point.price;
        }
        self.observations += 1;
    }
}

/// Group a price series into calendar-year buckets, ordered by year.
///
/// An empty series yields no buckets. Years without observations never
/// produce a bucket.
pub fn resample_annual(series: &PriceSeries) -> Vec<YearBucket> {
    let mut buckets: BTreeMap<i32, YearBucket> = BTreeMap::new();

    for point in series.points() {
        buckets
            .entry(point.year())
            .and_modify(|bucket| bucket.absorb(point))
            .or_insert_with(|| YearBucket::open(point));
    }

    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("AAPL");
        assert!(resample_annual(&series).is_empty());
    }

    #[test]
    fn test_one_bucket_per_distinct_year() {
        let series = PriceSeries::from_pairs(
            "AAPL",
            [
                (date(2020, 1, 2), 1.0),
                (date(2020, 12, 31), 2.0),
                (date(2021, 6, 1), 3.0),
                (date(2023, 2, 1), 4.0),
            ],
        );

        let buckets = resample_annual(&series);
        let years: Vec<i32> = buckets.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![2020, 2021, 2023]);
        assert_eq!(buckets[0].observations, 2);
    }

    #[test]
    fn test_unsorted_input_uses_dates() {
        let series = PriceSeries::from_pairs(
            "AAPL",
            [
                (date(2021, 7, 1), 150.0),
                (date(2021, 12, 30), 180.0),
                (date(2021, 1, 4), 130.0),
                (date(2021, 3, 15), 120.0),
            ],
        );

        let buckets = resample_annual(&series);
        assert_eq!(buckets.len(), 1);
        let bucket = buckets[0];
        assert_eq!(bucket.first_date, date(2021, 1, 4));
        assert_eq!(bucket.first_price, 130.0);
        assert_eq!(bucket.last_date, date(2021, 12, 30));
        assert_eq!(bucket.last_price, 180.0);
        assert_eq!(bucket.observations, 4);
    }

    #[test]
    fn test_single_observation_year() {
        let series = PriceSeries::from_pairs("AAPL", [(date(2022, 5, 5), 42.0)]);

        let buckets = resample_annual(&series);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].first_price, buckets[0].last_price);
        assert_eq!(buckets[0].first_date, buckets[0].last_date);
    }

    #[test]
    fn test_duplicate_dates_tie_break() {
        let series = PriceSeries::from_pairs(
            "AAPL",
            [
                (date(2020, 1, 2), 10.0),
                (date(2020, 1, 2), 11.0),
                (date(2020, 6, 1), 12.0),
                (date(2020, 6, 1), 13.0),
            ],
        );

        let bucket = resample_annual(&series)[0];
        assert_eq!(bucket.first_price, 10.0);
        assert_eq!(bucket.last_price, 13.0);
    }
}
