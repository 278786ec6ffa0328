use crate::error::RosaError;
use crate::model::TuningConfig;

/// Load a TuneD spec file (JSON or YAML) into a tuning config payload.
///
/// The spec is passed through untouched; the service validates its schema.
pub fn build_tuning_config(name: &str, spec_path: &str) -> crate::Result<TuningConfig> {
    let content = std::fs::read_to_string(spec_path)
        .map_err(|e| RosaError::Validation(format!("Expected a valid TuneD spec file: {}", e)))?;

    let spec = match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str::<serde_json::Value>(&content).map_err(|e| {
            RosaError::Validation(format!("Expected a valid TuneD spec file: {}", e))
        })?,
    };
    if spec.is_null() {
        return Err(RosaError::Validation(format!(
            "Expected a valid TuneD spec file: '{}' is empty",
            spec_path
        )));
    }

    Ok(TuningConfig {
        id: String::new(),
        name: name.to_string(),
        spec,
    })
}
