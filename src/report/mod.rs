// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Sheet row construction and ordering.
//!
//! Each master-list entry and its fetched detail are merged into a new
//! [`BillRecord`]; the inputs stay untouched. Sorting is a separate step
//! keyed on the parsed last-action date, newest first.

use chrono::NaiveDate;

use crate::legiscan::{BillDetail, MasterListEntry};

pub const HEADER: [&str; 8] = [
    "bill ID",
    "last action",
    "bill number",
    "description",
    "link",
    "subjects",
    "sponsors",
    "supplements",
];

/// One bill ready for upload: the master-list fields merged with the
/// fetched detail fields.
#[derive(Debug, Clone)]
pub struct BillRecord {
    pub bill_id: i64,
    pub bill_number: String,
    pub last_action_date: String,
    pub description: String,
    pub state_link: String,
    pub subjects: Vec<String>,
    pub sponsors: Vec<String>,
    pub has_supplement: bool,
}

impl BillRecord {
    /// Build the merged record. Detail fields win where both sides carry
    /// one; the last action date only exists on the master list.
    pub fn merge(entry: &MasterListEntry, detail: &BillDetail) -> Self {
        // TODO: confirm which supplement types should flag a bill. The
        // upstream sheet compared type_id against the fiscal-note types
        // (2/3) but shipped an always-true predicate, so in practice any
        // supplement set the flag; that behavior is kept here.
        let has_supplement = !detail.supplements.is_empty();
        Self {
            bill_id: entry.bill_id,
            bill_number: non_empty_or(&detail.bill_number, &entry.number),
            last_action_date: entry.last_action_date.clone(),
            description: non_empty_or(&detail.description, &entry.description),
            state_link: detail.state_link.clone(),
            subjects: detail
                .subjects
                .iter()
                .map(|subject| subject.subject_name.clone())
                .collect(),
            sponsors: detail
                .sponsors
                .iter()
                .map(|sponsor| sponsor.name.clone())
                .collect(),
            has_supplement,
        }
    }

    /// Sort key: the parsed last-action date, if it parses.
    pub fn sort_key(&self) -> Option<NaiveDate> {
        parse_action_date(&self.last_action_date)
    }

    /// Render the sheet row for this bill.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.bill_id.to_string(),
            self.last_action_date.clone(),
            self.bill_number.clone(),
            self.description.clone(),
            self.state_link.clone(),
            self.subjects.join(", "),
            self.sponsors.join(", "),
            if self.has_supplement { "TRUE" } else { "FALSE" }.to_string(),
        ]
    }
}

fn non_empty_or(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

/// Parse a `YYYY-MM-DD` or `YYYY/MM/DD` action date.
pub fn parse_action_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split(['-', '/']);
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Header plus one row per record, newest action first. Records whose date
/// does not parse go last; ties keep their input order.
pub fn sheet_rows(records: &[BillRecord]) -> Vec<Vec<String>> {
    let mut sorted: Vec<&BillRecord> = records.iter().collect();
    sorted.sort_by(|a, b| match (a.sort_key(), b.sort_key()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(HEADER.iter().map(|cell| cell.to_string()).collect());
    rows.extend(sorted.iter().map(|record| record.to_row()));
    rows
}
