//! Canned disease responses — keyword table consulted before any remote call.
//!
//! Matching is case-insensitive substring containment of the keyword anywhere
//! in the user text. The table is ordered and the first matching entry wins;
//! there is no ranking by specificity or length.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One keyword → reply pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedEntry {
    pub keyword: String,
    pub reply: String,
}

/// Ordered first-match-wins response table.
#[derive(Debug, Clone)]
pub struct CannedResponses {
    entries: Vec<CannedEntry>,
}

impl CannedResponses {
    /// The built-in eggplant disease table.
    pub fn builtin() -> Self {
        let table = [
            (
                "Insect Pest Disease",
                "Insect pests like aphids, whiteflies, and mites can attack eggplants. \
                 Use insecticidal soaps or neem oil for effective control.",
            ),
            (
                "Leaf Spot Disease",
                "Leaf Spot Disease is caused by fungi or bacteria, leading to brown or \
                 black spots on leaves. Apply fungicides and maintain proper spacing \
                 between plants to prevent it.",
            ),
            (
                "Mosaic Virus Disease",
                "Mosaic Virus Disease causes mottled patterns on leaves and stunted \
                 growth. Remove infected plants and control insect vectors like aphids.",
            ),
            (
                "Small Leaf Disease",
                "Small Leaf Disease leads to reduced leaf size and poor growth. Ensure \
                 proper nutrient supply and monitor for pest infestations.",
            ),
            (
                "White Mold Disease",
                "White Mold Disease causes white, cottony growth on stems and leaves. \
                 Avoid overwatering and use fungicides as needed.",
            ),
            (
                "Wilt Disease",
                "Wilt Disease can be caused by fungi like Fusarium or bacteria. Ensure \
                 well-drained soil and rotate crops to prevent buildup of pathogens.",
            ),
        ];

        Self {
            entries: table
                .into_iter()
                .map(|(keyword, reply)| CannedEntry {
                    keyword: keyword.to_string(),
                    reply: reply.to_string(),
                })
                .collect(),
        }
    }

    /// Load a table from a JSON file holding an array of `{keyword, reply}`
    /// objects, in match-priority order.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CannedEntry> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CannedEntry] {
        &self.entries
    }

    /// First entry whose keyword appears (case-insensitively) in `text`.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .find(|e| lower.contains(&e.keyword.to_lowercase()))
            .map(|e| e.reply.as_str())
    }
}

impl Default for CannedResponses {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let canned = CannedResponses::builtin();
        let expected = canned.entries()[1].reply.clone();
        for input in [
            "my plant has Leaf Spot Disease",
            "my plant has leaf spot disease",
            "LEAF SPOT DISEASE on the lower leaves",
        ] {
            assert_eq!(canned.lookup(input), Some(expected.as_str()), "{input}");
        }
    }

    #[test]
    fn lookup_matches_substring_anywhere() {
        let canned = CannedResponses::builtin();
        assert!(canned.lookup("what do I do about wilt disease??").is_some());
        assert!(canned.lookup("wilt").is_none(), "partial keyword must not match");
    }

    #[test]
    fn no_match_returns_none() {
        let canned = CannedResponses::builtin();
        assert_eq!(canned.lookup("how tall do eggplants grow?"), None);
        assert_eq!(canned.lookup(""), None);
    }

    #[test]
    fn first_match_wins_in_table_order() {
        let canned = CannedResponses {
            entries: vec![
                CannedEntry {
                    keyword: "spot".into(),
                    reply: "first".into(),
                },
                CannedEntry {
                    keyword: "leaf spot".into(),
                    reply: "second".into(),
                },
            ],
        };
        // "leaf spot" is the more specific keyword but "spot" comes first.
        assert_eq!(canned.lookup("I see a leaf spot"), Some("first"));
    }

    #[test]
    fn loads_table_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"keyword": "Blossom End Rot", "reply": "Add calcium."}}]"#
        )
        .unwrap();

        let canned = CannedResponses::from_json_file(file.path()).unwrap();
        assert_eq!(canned.lookup("blossom end rot on fruit"), Some("Add calcium."));
        assert_eq!(canned.lookup("wilt disease"), None);
    }

    #[test]
    fn rejects_malformed_table_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            CannedResponses::from_json_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
