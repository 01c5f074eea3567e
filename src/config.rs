//! Data-driven deck configuration
//!
//! Everything that used to be a literal in the page script (section ids,
//! KPI snapshots, which section triggers which stage) lives here so a page
//! variant can ship its own JSON.

use serde::{Deserialize, Serialize};

use crate::consts::{LOOKAHEAD_PX, RIBBON_REVEAL_PX};
use crate::error::{DeckError, DeckResult};
use crate::stage::{Snapshot, Stage, StageMapper, TriggerAnchor};

/// One stage entry: its snapshot and the section whose start enters it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: String,
    pub snapshot: Snapshot,
    /// Section that triggers this stage (absent for the initial stage)
    #[serde(default)]
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Pixels added to the scroll offset when locating the active section
    pub lookahead_px: f64,
    /// Scroll offset past which the KPI ribbon is shown
    pub ribbon_reveal_px: f64,
    /// Trigger line used for stage boundaries
    pub stage_anchor: TriggerAnchor,
    /// Sections tracked by the nav dots, in page order
    pub sections: Vec<String>,
    pub stages: Vec<StageConfig>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        let kpi = |units, revenue, ebitda, cash| {
            Snapshot::new()
                .with("units", units)
                .with("revenue", revenue)
                .with("ebitda", ebitda)
                .with("cash", cash)
        };

        Self {
            lookahead_px: LOOKAHEAD_PX,
            ribbon_reveal_px: RIBBON_REVEAL_PX,
            stage_anchor: TriggerAnchor::default(),
            sections: ["hero", "overview", "framework-preview", "insights", "team"]
                .into_iter()
                .map(String::from)
                .collect(),
            stages: vec![
                StageConfig {
                    id: "start".into(),
                    snapshot: kpi(65595.0, 1154.0, -13.4, 0.0),
                    trigger: None,
                },
                StageConfig {
                    id: "mid".into(),
                    snapshot: kpi(180000.0, 3200.0, -5.2, 450.0),
                    trigger: Some("pyramid".into()),
                },
                StageConfig {
                    id: "end".into(),
                    snapshot: kpi(340000.0, 5880.0, 2.5, 1314.0),
                    trigger: Some("stargate".into()),
                },
            ],
        }
    }
}

impl DeckConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> DeckResult<Self> {
        let config: DeckConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> DeckResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> DeckResult<()> {
        if self.stages.is_empty() {
            return Err(DeckError::Config("at least one stage is required".into()));
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|s| s.id == stage.id) {
                return Err(DeckError::Config(format!("duplicate stage `{}`", stage.id)));
            }
            if i > 0 {
                let Some(trigger) = &stage.trigger else {
                    return Err(DeckError::Config(format!("stage `{}` has no trigger section", stage.id)));
                };
                if self.stages[1..i].iter().any(|s| s.trigger.as_ref() == Some(trigger)) {
                    return Err(DeckError::Config(format!("section `{}` triggers more than one stage", trigger)));
                }
            }
        }
        if !(self.lookahead_px.is_finite() && self.ribbon_reveal_px.is_finite()) {
            return Err(DeckError::Config("offsets must be finite".into()));
        }
        Ok(())
    }

    pub fn stage_mapper(&self) -> StageMapper {
        StageMapper::new(
            self.stages
                .iter()
                .map(|s| (Stage::new(s.id.clone(), s.snapshot.clone()), s.trigger.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DeckConfig::default();
        config.validate().unwrap();
        assert_eq!(config.stages.len(), 3);
        assert_eq!(config.stages[0].snapshot.get("units"), Some(65595.0));
        assert_eq!(config.stages[2].snapshot.get("ebitda"), Some(2.5));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DeckConfig::from_json(r#"{ "lookahead_px": 60 }"#).unwrap();
        assert_eq!(config.lookahead_px, 60.0);
        assert_eq!(config.ribbon_reveal_px, RIBBON_REVEAL_PX);
        assert_eq!(config.sections.len(), 5);
    }

    #[test]
    fn test_json_stages_and_anchor() {
        let json = r#"{
            "stage_anchor": { "kind": "lookahead", "value": 100 },
            "stages": [
                { "id": "q1", "snapshot": { "units": 10 } },
                { "id": "q2", "snapshot": { "units": 20 }, "trigger": "growth" }
            ]
        }"#;
        let config = DeckConfig::from_json(json).unwrap();
        assert_eq!(config.stage_anchor, TriggerAnchor::Lookahead(100.0));
        let mapper = config.stage_mapper();
        assert_eq!(mapper.trigger_sections(), vec!["growth"]);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(DeckConfig::from_json("{ nope"), Err(DeckError::Config(_))));
        assert!(DeckConfig::from_json(r#"{ "stages": [] }"#).is_err());

        let missing_trigger = r#"{ "stages": [
            { "id": "a", "snapshot": {} },
            { "id": "b", "snapshot": {} }
        ] }"#;
        assert!(DeckConfig::from_json(missing_trigger).is_err());

        let shared_trigger = r#"{ "stages": [
            { "id": "a", "snapshot": {} },
            { "id": "b", "snapshot": {}, "trigger": "x" },
            { "id": "c", "snapshot": {}, "trigger": "x" }
        ] }"#;
        assert!(DeckConfig::from_json(shared_trigger).is_err());

        let duplicate = r#"{ "stages": [
            { "id": "a", "snapshot": {} },
            { "id": "a", "snapshot": {}, "trigger": "x" }
        ] }"#;
        assert!(DeckConfig::from_json(duplicate).is_err());
    }

    #[test]
    fn test_json_round_trip_default() {
        let json = DeckConfig::default().to_json().unwrap();
        assert_eq!(DeckConfig::from_json(&json).unwrap(), DeckConfig::default());
    }
}
