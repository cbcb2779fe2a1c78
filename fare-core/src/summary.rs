//! Keyword classification of a free-text weather description into the
//! short and long summary vocabularies the fare model was trained on.
//!
//! Both tables are scanned in order and the first keyword that occurs as a
//! substring wins. Some later entries are shadowed by earlier ones (e.g.
//! "light rain" never matches because "rain" comes first); the order is part
//! of the model's input contract and must be kept as is.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShortSummary {
    MostlyCloudy,
    Rain,
    Clear,
    PartlyCloudy,
    Overcast,
    LightRain,
    Foggy,
    Drizzle,
}

impl ShortSummary {
    /// Exact category string seen by the encoder, padding included.
    pub fn category(&self) -> &'static str {
        match self {
            ShortSummary::MostlyCloudy => " Mostly Cloudy ",
            ShortSummary::Rain => " Rain ",
            ShortSummary::Clear => " Clear ",
            ShortSummary::PartlyCloudy => " Partly Cloudy ",
            ShortSummary::Overcast => " Overcast ",
            ShortSummary::LightRain => " Light Rain ",
            ShortSummary::Foggy => " Foggy ",
            ShortSummary::Drizzle => " Drizzle ",
        }
    }
}

impl fmt::Display for ShortSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category().trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LongSummary {
    RainThroughoutTheDay,
    RainUntilMorning,
    LightRainInTheMorning,
    PartlyCloudyThroughoutTheDay,
    MostlyCloudyThroughoutTheDay,
    LightRainOvernight,
    LightRainUntilEvening,
    FoggyInTheMorning,
    OvercastThroughoutTheDay,
    PossibleDrizzleInTheMorning,
    RainInTheMorningAndAfternoon,
}

impl LongSummary {
    /// Exact category string seen by the encoder, padding included.
    pub fn category(&self) -> &'static str {
        match self {
            LongSummary::RainThroughoutTheDay => " Rain throughout the day. ",
            LongSummary::RainUntilMorning => " Rain until morning, starting again in the evening. ",
            LongSummary::LightRainInTheMorning => " Light rain in the morning. ",
            LongSummary::PartlyCloudyThroughoutTheDay => " Partly cloudy throughout the day. ",
            LongSummary::MostlyCloudyThroughoutTheDay => " Mostly cloudy throughout the day. ",
            LongSummary::LightRainOvernight => " Light rain in the morning and overnight. ",
            LongSummary::LightRainUntilEvening => " Light rain until evening. ",
            LongSummary::FoggyInTheMorning => " Foggy in the morning. ",
            LongSummary::OvercastThroughoutTheDay => " Overcast throughout the day. ",
            LongSummary::PossibleDrizzleInTheMorning => " Possible drizzle in the morning. ",
            LongSummary::RainInTheMorningAndAfternoon => " Rain in the morning and afternoon. ",
        }
    }
}

impl fmt::Display for LongSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category().trim())
    }
}

const SHORT_TABLE: &[(&str, ShortSummary)] = &[
    ("cloudy", ShortSummary::MostlyCloudy),
    ("rain", ShortSummary::Rain),
    ("clear", ShortSummary::Clear),
    ("partly cloudy", ShortSummary::PartlyCloudy),
    ("overcast", ShortSummary::Overcast),
    ("light rain", ShortSummary::LightRain),
    ("foggy", ShortSummary::Foggy),
    ("drizzle", ShortSummary::Drizzle),
];

const LONG_TABLE: &[(&str, LongSummary)] = &[
    ("rain throughout the day", LongSummary::RainThroughoutTheDay),
    ("rain until morning", LongSummary::RainUntilMorning),
    ("light rain in the morning", LongSummary::LightRainInTheMorning),
    ("partly cloudy throughout the day", LongSummary::PartlyCloudyThroughoutTheDay),
    ("mostly cloudy throughout the day", LongSummary::MostlyCloudyThroughoutTheDay),
    ("light rain overnight", LongSummary::LightRainOvernight),
    ("light rain until evening", LongSummary::LightRainUntilEvening),
    ("foggy in the morning", LongSummary::FoggyInTheMorning),
    ("overcast throughout the day", LongSummary::OvercastThroughoutTheDay),
    ("possible drizzle in the morning", LongSummary::PossibleDrizzleInTheMorning),
    ("rain in the morning and afternoon", LongSummary::RainInTheMorningAndAfternoon),
];

fn first_match<T: Copy>(table: &[(&str, T)], description: &str) -> Option<T> {
    table
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|(_, label)| *label)
}

pub fn short_summary(description: &str) -> ShortSummary {
    first_match(SHORT_TABLE, &description.to_lowercase()).unwrap_or(ShortSummary::Clear)
}

pub fn long_summary(description: &str) -> LongSummary {
    first_match(LONG_TABLE, &description.to_lowercase())
        .unwrap_or(LongSummary::PartlyCloudyThroughoutTheDay)
}

/// Classify a provider description into `(short, long)` summaries.
pub fn classify(description: &str) -> (ShortSummary, LongSummary) {
    (short_summary(description), long_summary(description))
}
