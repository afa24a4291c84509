//! Temperature to mood classification.

use moodcast_weather::TemperatureUnit;
use serde::{Deserialize, Serialize};

const GLOOMY_BELOW_CELSIUS: f64 = 10.0;
const INTENSE_ABOVE_CELSIUS: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Gloomy,
    Pleasant,
    Intense,
}

impl Mood {
    /// Bucket a temperature. 10 °C and 25 °C both land in `Pleasant`.
    pub fn from_temperature(temperature: f64, unit: TemperatureUnit) -> Self {
        let celsius = unit.to_celsius(temperature);
        if celsius < GLOOMY_BELOW_CELSIUS {
            Self::Gloomy
        } else if celsius > INTENSE_ABOVE_CELSIUS {
            Self::Intense
        } else {
            Self::Pleasant
        }
    }

    pub fn search_terms(self) -> &'static [&'static str] {
        match self {
            Self::Gloomy => &["crisis", "tragedy", "disaster", "recession", "depression"],
            Self::Intense => &["warning", "danger", "threat", "emergency", "alert"],
            Self::Pleasant => &[
                "success",
                "victory",
                "achievement",
                "celebration",
                "breakthrough",
            ],
        }
    }

    /// Boolean-OR search string for the provider's search endpoint
    pub fn query(self) -> String {
        self.search_terms().join(" OR ")
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gloomy => "Cold & Gloomy",
            Self::Pleasant => "Cool & Pleasant",
            Self::Intense => "Hot & Intense",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(temperature: f64, unit: TemperatureUnit) -> (Mood, String) {
    let mood = Mood::from_temperature(temperature, unit);
    (mood, mood.query())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_boundaries() {
        use TemperatureUnit::Celsius;
        assert_eq!(classify(9.9, Celsius).0, Mood::Gloomy);
        assert_eq!(classify(10.0, Celsius).0, Mood::Pleasant);
        assert_eq!(classify(25.0, Celsius).0, Mood::Pleasant);
        assert_eq!(classify(25.1, Celsius).0, Mood::Intense);
    }

    #[test]
    fn test_fahrenheit_is_normalized() {
        use TemperatureUnit::Fahrenheit;
        // 50 °F is exactly 10 °C, the lower edge of Pleasant
        assert_eq!(classify(50.0, Fahrenheit).0, Mood::Pleasant);
        assert_eq!(classify(49.9, Fahrenheit).0, Mood::Gloomy);
        assert_eq!(classify(32.0, Fahrenheit).0, Mood::Gloomy);
        assert_eq!(classify(86.0, Fahrenheit).0, Mood::Intense);
        assert_eq!(classify(68.0, Fahrenheit).0, Mood::Pleasant);
    }

    #[test]
    fn test_query_strings() {
        assert_eq!(
            classify(0.0, TemperatureUnit::Celsius).1,
            "crisis OR tragedy OR disaster OR recession OR depression"
        );
        assert_eq!(
            classify(30.0, TemperatureUnit::Celsius).1,
            "warning OR danger OR threat OR emergency OR alert"
        );
        assert_eq!(
            classify(18.0, TemperatureUnit::Celsius).1,
            "success OR victory OR achievement OR celebration OR breakthrough"
        );
    }

    #[test]
    fn test_extreme_inputs_are_total() {
        use TemperatureUnit::Celsius;
        assert_eq!(classify(-273.15, Celsius).0, Mood::Gloomy);
        assert_eq!(classify(1.0e9, Celsius).0, Mood::Intense);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Mood::Gloomy.label(), "Cold & Gloomy");
        assert_eq!(Mood::Pleasant.to_string(), "Cool & Pleasant");
        assert_eq!(Mood::Intense.label(), "Hot & Intense");
    }
}
