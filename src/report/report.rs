use serde::{Deserialize, Serialize};

use crate::beacon::PulseRef;
use crate::hierarchy::{Hierarchy, HousingRollup};

/// How the run is dated in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunMetadata {
    /// Draw seeded from a beacon pulse: `{ts, p, c, u}`.
    Beacon(PulseRef),
    /// Plain run date: `{fecha}`.
    Date {
        #[serde(rename = "fecha")]
        date: String,
    },
}

/// The exported audit document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub metadata: Option<RunMetadata>,
    /// Housing units per region over the whole cartography.
    #[serde(rename = "v")]
    pub housing: HousingRollup,
    /// Drawn blocks by region, province, municipality and district.
    #[serde(rename = "r")]
    pub regions: Hierarchy,
}

impl Report {
    /// Compose the final document. Nothing is copied or transformed.
    pub fn assemble(metadata: Option<RunMetadata>, regions: Hierarchy, housing: HousingRollup) -> Self {
        Self { metadata, housing, regions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, Location};

    fn parts() -> (Hierarchy, HousingRollup) {
        let mut tree = Hierarchy::new();
        tree.insert(Block::new(5, Location::new("R1", "P", "C", "D"), 10, 3, vec![1, 3], vec![[-33.25, -70.5].into()]));
        let mut rollup = HousingRollup::default();
        rollup.accumulate("R1", 30);
        (tree, rollup)
    }

    #[test]
    fn beacon_mode_layout() {
        let (tree, rollup) = parts();
        let pulse = PulseRef { timestamp: "2021-06-20T16:00:00.000Z".into(), pulse_index: 9, chain_index: 1, uri: "u".into() };
        let report = Report::assemble(Some(RunMetadata::Beacon(pulse)), tree, rollup);

        let text = serde_json::to_string(&report).unwrap();
        assert!(text.starts_with(r#"{"ts":"2021-06-20T16:00:00.000Z","p":9,"c":1,"u":"u","v":{"R1":30},"r":{"R1""#));

        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back.metadata, report.metadata);
        assert_eq!(back.housing, report.housing);
    }

    #[test]
    fn date_mode_layout() {
        let (tree, rollup) = parts();
        let report = Report::assemble(Some(RunMetadata::Date { date: "2021-06-20".into() }), tree, rollup);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fecha"], "2021-06-20");
        assert!(json.get("ts").is_none());

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back.metadata, Some(RunMetadata::Date { date: "2021-06-20".into() }));
    }

    #[test]
    fn without_metadata() {
        let (tree, rollup) = parts();
        let report = Report::assemble(None, tree, rollup);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(json["r"]["R1"]["P"]["C"]["D"][0]["s"], serde_json::json!([1, 3]));
    }
}
