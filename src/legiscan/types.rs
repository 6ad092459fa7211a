// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

use crate::fetcher::WorkItem;

/// One bill summary from the state master list.
///
/// `change_hash` is the version fingerprint for the bill's full record;
/// LegiScan changes it whenever any detail of the bill changes.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterListEntry {
    pub bill_id: i64,
    #[serde(default)]
    pub number: String,
    pub change_hash: String,
    #[serde(default)]
    pub last_action_date: String,
    #[serde(default)]
    pub last_action: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl WorkItem for MasterListEntry {
    fn id(&self) -> i64 {
        self.bill_id
    }

    fn fingerprint(&self) -> &str {
        &self.change_hash
    }
}

/// Full bill record returned by `getBill`. This is the payload cached per
/// change hash, so it round-trips through serde_json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetail {
    pub bill_id: i64,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state_link: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
    #[serde(default)]
    pub supplements: Vec<Supplement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub subject_id: i64,
    pub subject_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(default)]
    pub people_id: i64,
    pub name: String,
}

/// Supplementary document attached to a bill (fiscal notes, analyses, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplement {
    #[serde(default)]
    pub supplement_id: i64,
    pub type_id: i64,
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_list_entry_is_a_work_item() {
        let entry: MasterListEntry = serde_json::from_value(serde_json::json!({
            "bill_id": 1723344,
            "number": "HB4001",
            "change_hash": "e54c6d1b",
            "last_action_date": "2026-02-11",
            "last_action": "referred to committee",
            "title": "A bill",
            "description": "A bill to do things",
            "url": "https://legiscan.com/MI/bill/HB4001"
        }))
        .unwrap();
        assert_eq!(entry.id(), 1723344);
        assert_eq!(entry.fingerprint(), "e54c6d1b");
    }

    #[test]
    fn bill_detail_roundtrips_through_cache_encoding() {
        let detail = BillDetail {
            bill_id: 7,
            bill_number: "SB0042".to_string(),
            title: "Budget".to_string(),
            description: "Appropriations".to_string(),
            state_link: "https://example.org/SB0042".to_string(),
            subjects: vec![Subject {
                subject_id: 3,
                subject_name: "Appropriations".to_string(),
            }],
            sponsors: vec![Sponsor {
                people_id: 11,
                name: "Rivera".to_string(),
            }],
            supplements: vec![Supplement {
                supplement_id: 99,
                type_id: 3,
                type_name: "Fiscal Note".to_string(),
                title: "Fiscal Note".to_string(),
            }],
        };
        let payload = serde_json::to_string(&detail).unwrap();
        let back: BillDetail = serde_json::from_str(&payload).unwrap();
        assert_eq!(back.bill_id, 7);
        assert_eq!(back.supplements[0].type_name, "Fiscal Note");
    }

    #[test]
    fn unknown_detail_fields_are_ignored() {
        let detail: BillDetail = serde_json::from_value(serde_json::json!({
            "bill_id": 1,
            "bill_number": "HB1",
            "status": 4,
            "history": [{"date": "2026-01-01", "action": "introduced"}]
        }))
        .unwrap();
        assert!(detail.subjects.is_empty());
        assert_eq!(detail.bill_number, "HB1");
    }
}
