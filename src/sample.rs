//! Sample sequence mapping: prior unit assignments joined against the standards table.

use crate::standards::{SampleAssignment, StandardsTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An example unit built from a human-authored sample sequence.
///
/// `standards` and `descriptions` are parallel; an assignment whose id is not
/// in the standards table contributes an empty description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleUnit {
    pub unit_title: String,
    pub standards: Vec<String>,
    pub descriptions: Vec<String>,
}

/// Left-join `assignments` to `standards` on id and group by unit title.
///
/// Groups come out in ascending title order whatever the input order. Members
/// keep the order of the joined rows; an id present several times in the
/// table yields one member per matching row.
pub fn map_sample(standards: &StandardsTable, assignments: &[SampleAssignment]) -> Vec<SampleUnit> {
    let mut groups: BTreeMap<&str, SampleUnit> = BTreeMap::new();

    for assignment in assignments {
        let unit = groups
            .entry(assignment.unit_title.as_str())
            .or_insert_with(|| SampleUnit {
                unit_title: assignment.unit_title.clone(),
                standards: Vec::new(),
                descriptions: Vec::new(),
            });

        let mut matched = false;
        for standard in standards.matching(&assignment.id) {
            unit.standards.push(assignment.id.clone());
            unit.descriptions.push(standard.description.clone());
            matched = true;
        }
        if !matched {
            unit.standards.push(assignment.id.clone());
            unit.descriptions.push(String::new());
        }
    }

    groups.into_values().collect()
}
