//! The five-trait (OCEAN) score vector.
//!
//! Scores live in [0, 100]. Building a vector from untyped JSON rejects
//! missing, non-numeric and non-finite values, and clamps finite values that
//! fall outside the range.

use crate::error::TraitError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
pub const NEUTRAL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    /// Natural enumeration order (O, C, E, A, N).
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
        }
    }
}

/// Serialized with the capitalized trait names as keys, matching the JSON the
/// profiler asks the model for. Reading one back goes through `from_json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TraitVector {
    openness: f64,
    conscientiousness: f64,
    extraversion: f64,
    agreeableness: f64,
    neuroticism: f64,
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TraitVector {
    /// All five traits at 50.
    pub fn neutral() -> Self {
        Self {
            openness: NEUTRAL_SCORE,
            conscientiousness: NEUTRAL_SCORE,
            extraversion: NEUTRAL_SCORE,
            agreeableness: NEUTRAL_SCORE,
            neuroticism: NEUTRAL_SCORE,
        }
    }

    /// Build from five scores in O, C, E, A, N order.
    pub fn new(
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
    ) -> Result<Self, TraitError> {
        let scores = [openness, conscientiousness, extraversion, agreeableness, neuroticism];
        let invalid: Vec<String> = Trait::ALL
            .iter()
            .zip(scores)
            .filter(|(_, v)| !v.is_finite())
            .map(|(t, _)| t.as_str().to_string())
            .collect();

        if !invalid.is_empty() {
            return Err(TraitError::InvalidTraitVector { missing: Vec::new(), invalid });
        }

        Ok(Self {
            openness: clamp_score(openness),
            conscientiousness: clamp_score(conscientiousness),
            extraversion: clamp_score(extraversion),
            agreeableness: clamp_score(agreeableness),
            neuroticism: clamp_score(neuroticism),
        })
    }

    /// Build from an untyped JSON object keyed by trait name.
    ///
    /// Keys match case-insensitively; extra keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, TraitError> {
        let obj = value.as_object().ok_or(TraitError::NotAnObject)?;

        let mut scores = [0.0; 5];
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        for (slot, t) in scores.iter_mut().zip(Trait::ALL) {
            match lookup(obj, t) {
                None | Some(Value::Null) => missing.push(t.as_str().to_string()),
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(v) if v.is_finite() => *slot = v,
                    _ => invalid.push(t.as_str().to_string()),
                },
                Some(_) => invalid.push(t.as_str().to_string()),
            }
        }

        if !missing.is_empty() || !invalid.is_empty() {
            return Err(TraitError::InvalidTraitVector { missing, invalid });
        }

        Self::new(scores[0], scores[1], scores[2], scores[3], scores[4])
    }

    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Openness => self.openness,
            Trait::Conscientiousness => self.conscientiousness,
            Trait::Extraversion => self.extraversion,
            Trait::Agreeableness => self.agreeableness,
            Trait::Neuroticism => self.neuroticism,
        }
    }

    pub fn openness(&self) -> f64 {
        self.openness
    }

    pub fn conscientiousness(&self) -> f64 {
        self.conscientiousness
    }

    pub fn extraversion(&self) -> f64 {
        self.extraversion
    }

    pub fn agreeableness(&self) -> f64 {
        self.agreeableness
    }

    pub fn neuroticism(&self) -> f64 {
        self.neuroticism
    }

    /// (trait, score) pairs in natural order.
    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self.get(t)))
    }

    /// Compact form for log lines: "O=73 C=54 E=33 A=60 N=25".
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(t, v)| format!("{}={:.0}", &t.as_str()[..1], v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, t: Trait) -> Option<&'a Value> {
    obj.get(t.as_str()).or_else(|| {
        obj.iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(t.as_str()))
            .map(|(_, v)| v)
    })
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(MIN_SCORE, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_neutral_is_default() {
        let v = TraitVector::default();
        assert!(v.iter().all(|(_, s)| s == 50.0));
    }

    #[test]
    fn test_from_json_reads_all_traits() {
        let v = TraitVector::from_json(&json!({
            "Openness": 73, "Conscientiousness": 54, "Extraversion": 33,
            "Agreeableness": 60, "Neuroticism": 25
        }))
        .unwrap();

        assert_eq!(v.openness(), 73.0);
        assert_eq!(v.conscientiousness(), 54.0);
        assert_eq!(v.extraversion(), 33.0);
        assert_eq!(v.agreeableness(), 60.0);
        assert_eq!(v.neuroticism(), 25.0);
    }

    #[test]
    fn test_from_json_reports_missing_traits() {
        let err = TraitVector::from_json(&json!({
            "Openness": 73, "Conscientiousness": 54, "Extraversion": 33
        }))
        .unwrap_err();

        assert_eq!(
            err,
            TraitError::InvalidTraitVector {
                missing: vec!["Agreeableness".to_string(), "Neuroticism".to_string()],
                invalid: Vec::new(),
            }
        );
    }

    #[test]
    fn test_from_json_rejects_non_numeric() {
        let err = TraitVector::from_json(&json!({
            "Openness": "high", "Conscientiousness": 54, "Extraversion": 33,
            "Agreeableness": 60, "Neuroticism": null
        }))
        .unwrap_err();

        match err {
            TraitError::InvalidTraitVector { missing, invalid } => {
                assert_eq!(missing, vec!["Neuroticism"]);
                assert_eq!(invalid, vec!["Openness"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let v = TraitVector::from_json(&json!({
            "Openness": 140, "Conscientiousness": -5, "Extraversion": 33.5,
            "Agreeableness": 100, "Neuroticism": 0
        }))
        .unwrap();

        assert_eq!(v.openness(), 100.0);
        assert_eq!(v.conscientiousness(), 0.0);
        assert_eq!(v.extraversion(), 33.5);
    }

    #[test]
    fn test_new_rejects_nan() {
        let err = TraitVector::new(f64::NAN, 50.0, 50.0, f64::INFINITY, 50.0).unwrap_err();
        match err {
            TraitError::InvalidTraitVector { invalid, .. } => {
                assert_eq!(invalid, vec!["Openness", "Agreeableness"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let v = TraitVector::from_json(&json!({
            "openness": 10, "CONSCIENTIOUSNESS": 20, "Extraversion": 30,
            "agreeableness": 40, "neuroticism": 50, "Mood": "ignored"
        }))
        .unwrap();
        assert_eq!(v.summary(), "O=10 C=20 E=30 A=40 N=50");
    }

    #[test]
    fn test_serializes_with_trait_names() {
        let v = TraitVector::new(1.0, 2.0, 3.0, 4.0, 5.0).unwrap();
        let value = serde_json::to_value(v).unwrap();
        assert_eq!(
            value,
            json!({
                "Openness": 1.0, "Conscientiousness": 2.0, "Extraversion": 3.0,
                "Agreeableness": 4.0, "Neuroticism": 5.0
            })
        );
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(TraitVector::from_json(&json!([1, 2, 3])), Err(TraitError::NotAnObject));
    }
}
