//! Policy configuration
//!
//! Every rate, threshold and bonus the engine uses, with the canonical values as defaults. A
//! YAML policy file only needs to name what it changes.

use std::{fs, path::Path, time::Duration};

use jiff::{SignedDuration, civil::Weekday};
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, stock::LOW_STOCK_THRESHOLD},
    discounts::rules::{BulkRule, DiscountPolicy, EventRates, IndividualRateTable, SpecialDayRule},
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
    points::{PointsPolicy, QuantityTier, SetBonus},
    products::ProductId,
    promotions::{PromotionSchedule, PromotionTimer},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the policy file
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price or rate
    #[error(transparent)]
    Value(#[from] FixtureError),

    /// Unknown weekday name
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    /// Duration that can't be parsed or is negative
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// An amount or catalog in a currency other than the policy's
    #[error("Expected an amount in {expected}, got {found}")]
    CurrencyMismatch {
        /// Policy currency
        expected: &'static str,

        /// Currency found
        found: &'static str,
    },
}

/// All policies the engine evaluates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Currency the policy's amounts are written in
    pub currency: &'static Currency,

    /// Discount policies
    pub discounts: DiscountPolicy,

    /// Loyalty points policy
    pub points: PointsPolicy,

    /// Promotion timers
    pub schedule: PromotionSchedule,

    /// Remaining stock below which a product is reported as running low
    pub low_stock_threshold: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            currency: iso::KRW,
            discounts: DiscountPolicy::default(),
            points: PointsPolicy::default(),
            schedule: PromotionSchedule::default(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl PolicyConfig {
    /// Load a policy file, filling anything it leaves out with the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or holds an invalid value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a YAML policy document, filling anything it leaves out with the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is malformed or holds an invalid value.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        // A document holding only comments parses as null
        let raw: Option<RawPolicyConfig> = serde_norway::from_str(contents)?;

        raw.unwrap_or_default().try_into()
    }

    /// Check that a catalog is priced in the policy's currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CurrencyMismatch`] if the currencies differ.
    pub fn check_catalog(&self, catalog: &Catalog<'_>) -> Result<(), ConfigError> {
        same_currency(self.currency, catalog.currency())
    }
}

fn same_currency(
    expected: &'static Currency,
    found: &'static Currency,
) -> Result<(), ConfigError> {
    if expected == found {
        return Ok(());
    }

    Err(ConfigError::CurrencyMismatch {
        expected: expected.iso_alpha_code,
        found: found.iso_alpha_code,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolicyConfig {
    currency: Option<String>,

    #[serde(default)]
    discounts: RawDiscounts,

    #[serde(default)]
    points: RawPoints,

    #[serde(default)]
    schedule: RawSchedule,

    low_stock_threshold: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDiscounts {
    individual: Option<RawIndividual>,
    bulk: Option<RawBulk>,
    special_day: Option<RawSpecialDay>,
    events: Option<RawEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndividual {
    threshold: Option<u32>,
    rates: FxHashMap<ProductId, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBulk {
    threshold: Option<u32>,
    rate: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpecialDay {
    weekday: Option<String>,
    rate: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvents {
    flash: Option<String>,
    recommend: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPoints {
    base_unit: Option<String>,
    special_day: Option<String>,
    multiplier: Option<u64>,
    set_bonuses: Option<Vec<RawSetBonus>>,
    quantity_tiers: Option<Vec<RawQuantityTier>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSetBonus {
    name: String,
    products: Vec<ProductId>,
    points: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuantityTier {
    min_quantity: u32,
    points: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchedule {
    flash_sale: Option<RawTimer>,
    recommendation: Option<RawTimer>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTimer {
    max_initial_delay: Option<String>,
    interval: Option<String>,
}

impl TryFrom<RawPolicyConfig> for PolicyConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPolicyConfig) -> Result<Self, Self::Error> {
        let defaults = PolicyConfig::default();

        let currency = match raw.currency {
            Some(code) => iso::find(&code.to_uppercase())
                .ok_or(FixtureError::UnknownCurrency(code))?,
            None => defaults.currency,
        };

        Ok(Self {
            currency,
            discounts: raw.discounts.into_policy(defaults.discounts)?,
            points: raw.points.into_policy(defaults.points, currency)?,
            schedule: raw.schedule.into_schedule(defaults.schedule)?,
            low_stock_threshold: raw
                .low_stock_threshold
                .unwrap_or(defaults.low_stock_threshold),
        })
    }
}

impl RawDiscounts {
    fn into_policy(self, defaults: DiscountPolicy) -> Result<DiscountPolicy, ConfigError> {
        let individual = match self.individual {
            Some(raw) => IndividualRateTable::new(
                raw.threshold.unwrap_or(defaults.individual.threshold()),
                raw.rates
                    .into_iter()
                    .map(|(id, rate)| -> Result<_, ConfigError> {
                        Ok((id, parse_percentage(&rate)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => defaults.individual,
        };

        let bulk = match self.bulk {
            Some(raw) => BulkRule {
                threshold: raw.threshold.unwrap_or(defaults.bulk.threshold),
                rate: parse_or(raw.rate.as_deref(), defaults.bulk.rate)?,
            },
            None => defaults.bulk,
        };

        let special_day = match self.special_day {
            Some(raw) => SpecialDayRule {
                weekday: match raw.weekday {
                    Some(name) => parse_weekday(&name)?,
                    None => defaults.special_day.weekday,
                },
                rate: parse_or(raw.rate.as_deref(), defaults.special_day.rate)?,
            },
            None => defaults.special_day,
        };

        let events = match self.events {
            Some(raw) => EventRates {
                flash: parse_or(raw.flash.as_deref(), defaults.events.flash)?,
                recommend: parse_or(raw.recommend.as_deref(), defaults.events.recommend)?,
            },
            None => defaults.events,
        };

        Ok(DiscountPolicy {
            individual,
            bulk,
            special_day,
            events,
        })
    }
}

impl RawPoints {
    fn into_policy(
        self,
        defaults: PointsPolicy,
        currency: &'static Currency,
    ) -> Result<PointsPolicy, ConfigError> {
        let base_unit = match self.base_unit {
            Some(price) => {
                let (minor, found) = parse_price(&price)?;

                same_currency(currency, found)?;

                minor
            }
            None => defaults.base_unit,
        };

        let special_day = match self.special_day {
            Some(name) => parse_weekday(&name)?,
            None => defaults.special_day,
        };

        let set_bonuses = match self.set_bonuses {
            Some(raw) => raw
                .into_iter()
                .map(|set| SetBonus::new(set.name, set.products, set.points))
                .collect(),
            None => defaults.set_bonuses,
        };

        let quantity_tiers = match self.quantity_tiers {
            Some(raw) => raw
                .into_iter()
                .map(|tier| QuantityTier {
                    min_quantity: tier.min_quantity,
                    points: tier.points,
                })
                .collect(),
            None => defaults.quantity_tiers,
        };

        Ok(PointsPolicy {
            base_unit,
            special_day,
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
            set_bonuses,
            quantity_tiers,
        })
    }
}

impl RawSchedule {
    fn into_schedule(self, defaults: PromotionSchedule) -> Result<PromotionSchedule, ConfigError> {
        Ok(PromotionSchedule {
            flash_sale: match self.flash_sale {
                Some(raw) => raw.into_timer(defaults.flash_sale)?,
                None => defaults.flash_sale,
            },
            recommendation: match self.recommendation {
                Some(raw) => raw.into_timer(defaults.recommendation)?,
                None => defaults.recommendation,
            },
        })
    }
}

impl RawTimer {
    fn into_timer(self, defaults: PromotionTimer) -> Result<PromotionTimer, ConfigError> {
        Ok(PromotionTimer {
            max_initial_delay: match self.max_initial_delay {
                Some(value) => parse_duration(&value)?,
                None => defaults.max_initial_delay,
            },
            interval: match self.interval {
                Some(value) => parse_duration(&value)?,
                None => defaults.interval,
            },
        })
    }
}

fn parse_or(
    value: Option<&str>,
    default: decimal_percentage::Percentage,
) -> Result<decimal_percentage::Percentage, ConfigError> {
    match value {
        Some(value) => Ok(parse_percentage(value)?),
        None => Ok(default),
    }
}

/// Parse a non-negative duration such as `"30s"`, `"1m 30s"` or `"PT30S"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] if the value is malformed or negative.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(value.to_string());

    let signed: SignedDuration = value.trim().parse().map_err(|_err| invalid())?;

    Duration::try_from(signed).map_err(|_err| invalid())
}

/// Parse a weekday name, full or abbreviated, in any case.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWeekday`] for anything else.
pub fn parse_weekday(name: &str) -> Result<Weekday, ConfigError> {
    let weekday = match name.trim().to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Monday,
        "tuesday" | "tue" => Weekday::Tuesday,
        "wednesday" | "wed" => Weekday::Wednesday,
        "thursday" | "thu" => Weekday::Thursday,
        "friday" | "fri" => Weekday::Friday,
        "saturday" | "sat" => Weekday::Saturday,
        "sunday" | "sun" => Weekday::Sunday,
        _ => return Err(ConfigError::InvalidWeekday(name.to_string())),
    };

    Ok(weekday)
}

/// English name of a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}
