//! Generator parameters and schemas
//!
//! Parameters travel as a loosely typed key/value map (that is what a recipe
//! carries) and are clamped against a static schema before any kernel reads
//! them. Sanitization never fails: bad values fall back to defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum length of text parameters (seeds)
pub const MAX_TEXT_LEN: usize = 64;

/// A single parameter value as stored in a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Generator-specific parameter map, ordered by key for stable serialization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseParams {
    values: BTreeMap<String, ParamValue>,
}

impl NoiseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Numeric value, or 0.0 when absent or not numeric
    pub fn get_f64(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(ParamValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Numeric value rounded to a non-negative integer
    pub fn get_u32(&self, key: &str) -> u32 {
        self.get_f64(key).round().max(0.0) as u32
    }

    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(ParamValue::Bool(true)))
    }

    pub fn get_str(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(ParamValue::Text(s)) => s.as_str(),
            _ => "",
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read scalar entries from a JSON object; anything else is skipped
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        obj.iter()
            .filter_map(|(key, v)| {
                let value = match v {
                    serde_json::Value::Bool(b) => ParamValue::Bool(*b),
                    serde_json::Value::Number(n) => ParamValue::Number(n.as_f64()?),
                    serde_json::Value::String(s) => ParamValue::Text(s.clone()),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect()
    }
}

impl FromIterator<(String, ParamValue)> for NoiseParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Declared type and bounds of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamType {
    Range {
        min: f64,
        max: f64,
        default: f64,
        integer: bool,
    },
    Toggle {
        default: bool,
    },
    Select {
        options: &'static [&'static str],
        default: &'static str,
    },
    Text {
        default: &'static str,
    },
}

/// Schema entry for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub param_type: ParamType,
}

impl ParamSpec {
    pub const fn range(
        key: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            key,
            label,
            param_type: ParamType::Range {
                min,
                max,
                default,
                integer: false,
            },
        }
    }

    pub const fn integer(
        key: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            key,
            label,
            param_type: ParamType::Range {
                min,
                max,
                default,
                integer: true,
            },
        }
    }

    pub const fn toggle(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            param_type: ParamType::Toggle { default },
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            param_type: ParamType::Select { options, default },
        }
    }

    pub const fn text(key: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            key,
            label,
            param_type: ParamType::Text { default },
        }
    }

    pub fn default_value(&self) -> ParamValue {
        match self.param_type {
            ParamType::Range { default, .. } => ParamValue::Number(default),
            ParamType::Toggle { default } => ParamValue::Bool(default),
            ParamType::Select { default, .. } => ParamValue::Text(default.to_string()),
            ParamType::Text { default } => ParamValue::Text(default.to_string()),
        }
    }

    /// Coerce and clamp a raw value into this parameter's domain
    pub fn sanitize_value(&self, raw: Option<&ParamValue>) -> ParamValue {
        let Some(raw) = raw else {
            return self.default_value();
        };

        match self.param_type {
            ParamType::Range {
                min,
                max,
                default,
                integer,
            } => {
                let n = match raw {
                    ParamValue::Number(n) => Some(*n),
                    ParamValue::Text(s) => s.trim().parse::<f64>().ok(),
                    ParamValue::Bool(_) => None,
                };
                let n = n.filter(|n| n.is_finite()).unwrap_or(default).clamp(min, max);
                ParamValue::Number(if integer { n.round() } else { n })
            }
            ParamType::Toggle { default } => {
                let b = match raw {
                    ParamValue::Bool(b) => *b,
                    ParamValue::Number(n) if n.is_finite() => *n != 0.0,
                    ParamValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" | "on" => true,
                        "false" | "0" | "no" | "off" => false,
                        _ => default,
                    },
                    _ => default,
                };
                ParamValue::Bool(b)
            }
            ParamType::Select { options, default } => {
                let chosen = match raw {
                    ParamValue::Text(s) => {
                        let wanted = s.trim().to_ascii_lowercase();
                        options.iter().find(|o| **o == wanted).copied()
                    }
                    _ => None,
                };
                ParamValue::Text(chosen.unwrap_or(default).to_string())
            }
            ParamType::Text { default } => {
                let text = match raw {
                    ParamValue::Text(s) => s.trim().to_string(),
                    ParamValue::Number(n) if n.is_finite() => n.to_string(),
                    _ => String::new(),
                };
                let text = truncate_text(&text, MAX_TEXT_LEN);
                if text.is_empty() {
                    ParamValue::Text(default.to_string())
                } else {
                    ParamValue::Text(text)
                }
            }
        }
    }
}

/// Trim and cut `text` to at most `max_chars` characters.
///
/// Trims again after cutting so the result is a fixed point.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let cut: String = text.trim().chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

/// Sanitize a raw parameter map against a schema.
///
/// The result holds exactly the schema's keys; unknown keys are dropped.
pub fn sanitize_params(schema: &[ParamSpec], raw: &NoiseParams) -> NoiseParams {
    schema
        .iter()
        .map(|spec| (spec.key.to_string(), spec.sanitize_value(raw.get(spec.key))))
        .collect()
}

/// Defaults for every key in a schema
pub fn default_params(schema: &[ParamSpec]) -> NoiseParams {
    schema
        .iter()
        .map(|spec| (spec.key.to_string(), spec.default_value()))
        .collect()
}

/// A value inside a static preset table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PresetValue {
    Num(f64),
    Flag(bool),
    Text(&'static str),
}

impl From<PresetValue> for ParamValue {
    fn from(v: PresetValue) -> Self {
        match v {
            PresetValue::Num(n) => ParamValue::Number(n),
            PresetValue::Flag(b) => ParamValue::Bool(b),
            PresetValue::Text(s) => ParamValue::Text(s.to_string()),
        }
    }
}

/// Named partial override of a generator's defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub overrides: &'static [(&'static str, PresetValue)],
}

impl Preset {
    /// Overlay this preset on top of `base`
    pub fn apply_to(&self, base: &NoiseParams) -> NoiseParams {
        let mut params = base.clone();
        for (key, value) in self.overrides {
            params.insert(key, ParamValue::from(*value));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &[ParamSpec] = &[
        ParamSpec::range("scale", "Scale", 1.0, 64.0, 8.0),
        ParamSpec::integer("octaves", "Octaves", 1.0, 8.0, 4.0),
        ParamSpec::toggle("invert", "Invert", false),
        ParamSpec::select("axis", "Axis", &["horizontal", "vertical"], "horizontal"),
        ParamSpec::text("seed", "Seed", "fabrica"),
    ];

    #[test]
    fn test_missing_values_take_defaults() {
        let params = sanitize_params(SCHEMA, &NoiseParams::new());
        assert_eq!(params, default_params(SCHEMA));
    }

    #[test]
    fn test_ranges_clamp_and_round() {
        let raw = NoiseParams::new()
            .with_param("scale", 1000.0)
            .with_param("octaves", 2.6);
        let params = sanitize_params(SCHEMA, &raw);
        assert_eq!(params.get_f64("scale"), 64.0);
        assert_eq!(params.get_u32("octaves"), 3);
    }

    #[test]
    fn test_non_finite_and_wrong_types_fall_back() {
        let raw = NoiseParams::new()
            .with_param("scale", f64::NAN)
            .with_param("octaves", true)
            .with_param("axis", "diagonal");
        let params = sanitize_params(SCHEMA, &raw);
        assert_eq!(params.get_f64("scale"), 8.0);
        assert_eq!(params.get_u32("octaves"), 4);
        assert_eq!(params.get_str("axis"), "horizontal");
    }

    #[test]
    fn test_text_coercions() {
        let raw = NoiseParams::new()
            .with_param("scale", " 12.5 ")
            .with_param("invert", "on")
            .with_param("axis", " Vertical ")
            .with_param("seed", 42.0);
        let params = sanitize_params(SCHEMA, &raw);
        assert_eq!(params.get_f64("scale"), 12.5);
        assert!(params.get_bool("invert"));
        assert_eq!(params.get_str("axis"), "vertical");
        assert_eq!(params.get_str("seed"), "42");
    }

    #[test]
    fn test_text_trimmed_and_truncated() {
        let long = "x".repeat(200);
        let raw = NoiseParams::new().with_param("seed", long.as_str());
        let params = sanitize_params(SCHEMA, &raw);
        assert_eq!(params.get_str("seed").len(), MAX_TEXT_LEN);

        let blank = NoiseParams::new().with_param("seed", "   ");
        assert_eq!(sanitize_params(SCHEMA, &blank).get_str("seed"), "fabrica");
    }

    #[test]
    fn test_unknown_keys_dropped_and_idempotent() {
        let raw = NoiseParams::new()
            .with_param("bogus", 1.0)
            .with_param("scale", -5.0);
        let once = sanitize_params(SCHEMA, &raw);
        assert!(once.get("bogus").is_none());
        assert_eq!(sanitize_params(SCHEMA, &once), once);
    }

    #[test]
    fn test_from_json_skips_non_scalars() {
        let value = serde_json::json!({
            "scale": 3,
            "invert": true,
            "seed": "abc",
            "nested": {"x": 1},
            "list": [1, 2]
        });
        let params = NoiseParams::from_json(&value);
        assert_eq!(params.len(), 3);
        assert_eq!(params.get_f64("scale"), 3.0);
        assert!(NoiseParams::from_json(&serde_json::json!([1])).is_empty());
    }

    #[test]
    fn test_truncate_text_is_fixed_point() {
        let raw = format!("{} tail", "a".repeat(63));
        let once = truncate_text(&raw, MAX_TEXT_LEN);
        assert_eq!(once, "a".repeat(63));
        assert_eq!(truncate_text(&once, MAX_TEXT_LEN), once);
    }

    #[test]
    fn test_preset_overlay() {
        let preset = Preset {
            id: "coarse",
            label: "Coarse",
            overrides: &[("scale", PresetValue::Num(2.0))],
        };
        let params = preset.apply_to(&default_params(SCHEMA));
        assert_eq!(params.get_f64("scale"), 2.0);
        assert_eq!(params.get_u32("octaves"), 4);
    }
}
