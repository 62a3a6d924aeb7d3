//! Weather Capability
//!
//! Simulated conditions for a city: no real weather service is involved, so
//! demos work offline. Values land in plausible ranges after a short delay
//! that stands in for network latency.

use std::time::Duration;

use async_trait::async_trait;
use covalent_core::{
    Capability, CapabilityPayload, CapabilitySchema, ParameterSpec, Result as CoreResult,
};
use rand::Rng;

const SIMULATED_LATENCY: Duration = Duration::from_millis(500);

/// Reports simulated current weather for a city
pub struct GetWeatherCapability;

impl GetWeatherCapability {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GetWeatherCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capability for GetWeatherCapability {
    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema {
            name: "get_weather".into(),
            description:
                "Gets the current temperature and humidity for a given city and country.".into(),
            parameters: vec![
                ParameterSpec::string("city", "The city name"),
                ParameterSpec::string("country", "The country name"),
            ],
        }
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> CoreResult<CapabilityPayload> {
        let city = args.get("city").and_then(|v| v.as_str()).unwrap_or_default();
        let country = args
            .get("country")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        tokio::time::sleep(SIMULATED_LATENCY).await;

        let (temperature, humidity) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(5..=35), rng.gen_range(40..=90))
        };

        Ok(CapabilityPayload::Json(serde_json::json!({
            "temperature": temperature,
            "humidity": humidity,
            "unit": "Celsius",
            "location": format!("{city}, {country}"),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_plausible_conditions() {
        let capability = GetWeatherCapability::new();

        let mut args = serde_json::Map::new();
        args.insert("city".into(), serde_json::Value::String("Paris".into()));
        args.insert("country".into(), serde_json::Value::String("France".into()));

        let payload = capability.invoke(&args).await.unwrap();
        let CapabilityPayload::Json(report) = payload else {
            panic!("expected a JSON payload");
        };

        let temperature = report["temperature"].as_i64().unwrap();
        let humidity = report["humidity"].as_i64().unwrap();
        assert!((5..=35).contains(&temperature));
        assert!((40..=90).contains(&humidity));
        assert_eq!(report["unit"], "Celsius");
        assert_eq!(report["location"], "Paris, France");
    }

    #[test]
    fn test_schema_requires_city_and_country() {
        let schema = GetWeatherCapability::new().schema();
        assert_eq!(schema.name, "get_weather");
        assert_eq!(schema.required_names(), vec!["city", "country"]);
    }
}
