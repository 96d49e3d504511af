use std::collections::BTreeMap;

const WIND: &str = "Wind";
const OUTSIDE_TEMPERATURE: &str = "Outside Temperature";
const TIME: &str = "Time";

/// Weather fields as published by the station feed, e.g. `Wind` ->
/// `12 mph from 225°`. Keys and values are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReport {
    fields: BTreeMap<String, String>,
}

impl WeatherReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn wind(&self) -> Option<&str> {
        self.get(WIND)
    }

    pub fn outside_temperature(&self) -> Option<&str> {
        self.get(OUTSIDE_TEMPERATURE)
    }

    /// Observation time reported by the station, if any.
    pub fn observed_at(&self) -> Option<&str> {
        self.get(TIME)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for WeatherReport {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut report = WeatherReport::new();
        for (name, value) in iter {
            report.insert(name, value);
        }
        report
    }
}
