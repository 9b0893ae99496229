//! Three-level test hierarchy: app → physics suite → test type → test names.

use crate::reference::ReferenceRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One build configuration: an application paired with a physics suite.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPhysicsCombo {
    pub app: String,
    pub physics_suite: String,
}

impl AppPhysicsCombo {
    pub fn new(app: impl Into<String>, physics_suite: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            physics_suite: physics_suite.into(),
        }
    }
}

/// Insertion-ordered set of test names under one test type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestNames(Vec<String>);

impl TestNames {
    /// Returns false when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.0.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteNode {
    pub test_types: BTreeMap<String, TestNames>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNode {
    pub physics_suites: BTreeMap<String, SuiteNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHierarchy {
    pub apps: BTreeMap<String, AppNode>,
}

/// One leaf of the hierarchy, borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyLeaf<'a> {
    pub app: &'a str,
    pub physics_suite: &'a str,
    pub test_type: &'a str,
    pub test_name: &'a str,
}

impl HierarchyLeaf<'_> {
    pub fn combo(&self) -> AppPhysicsCombo {
        AppPhysicsCombo::new(self.app, self.physics_suite)
    }
}

impl TestHierarchy {
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a ReferenceRow>) -> Self {
        let mut hierarchy = Self::default();
        for row in rows {
            for name in &row.test_names {
                hierarchy.insert(&row.app, &row.physics_suite, &row.test_type, name);
            }
            // A row with an empty name list still declares its test type.
            if row.test_names.is_empty() {
                hierarchy.test_names_mut(&row.app, &row.physics_suite, &row.test_type);
            }
        }
        hierarchy
    }

    pub fn insert(&mut self, app: &str, physics_suite: &str, test_type: &str, name: &str) -> bool {
        self.test_names_mut(app, physics_suite, test_type)
            .insert(name)
    }

    /// Names under one path, creating intermediate nodes when missing.
    pub fn test_names_mut(
        &mut self,
        app: &str,
        physics_suite: &str,
        test_type: &str,
    ) -> &mut TestNames {
        self.apps
            .entry(app.to_string())
            .or_default()
            .physics_suites
            .entry(physics_suite.to_string())
            .or_default()
            .test_types
            .entry(test_type.to_string())
            .or_default()
    }

    pub fn test_names(&self, combo: &AppPhysicsCombo, test_type: &str) -> Option<&TestNames> {
        self.apps
            .get(&combo.app)?
            .physics_suites
            .get(&combo.physics_suite)?
            .test_types
            .get(test_type)
    }

    pub fn combos(&self) -> impl Iterator<Item = AppPhysicsCombo> + '_ {
        self.apps.iter().flat_map(|(app, node)| {
            node.physics_suites
                .keys()
                .map(move |suite| AppPhysicsCombo::new(app.as_str(), suite.as_str()))
        })
    }

    /// Every leaf in deterministic key order.
    pub fn leaves(&self) -> impl Iterator<Item = HierarchyLeaf<'_>> + '_ {
        self.apps.iter().flat_map(|(app, app_node)| {
            app_node
                .physics_suites
                .iter()
                .flat_map(move |(suite, suite_node)| {
                    suite_node
                        .test_types
                        .iter()
                        .flat_map(move |(test_type, names)| {
                            names.iter().map(move |test_name| HierarchyLeaf {
                                app: app.as_str(),
                                physics_suite: suite.as_str(),
                                test_type: test_type.as_str(),
                                test_name,
                            })
                        })
                })
        })
    }

    pub fn summary(&self) -> HierarchySummary {
        let mut combo_count = 0;
        let mut category_count = 0;
        let mut test_count = 0;
        let mut unique = BTreeSet::new();
        for app_node in self.apps.values() {
            for suite_node in app_node.physics_suites.values() {
                combo_count += 1;
                category_count += suite_node.test_types.len();
                let per_combo: BTreeSet<&str> = suite_node
                    .test_types
                    .values()
                    .flat_map(TestNames::iter)
                    .collect();
                test_count += per_combo.len();
                unique.extend(per_combo.into_iter().map(str::to_string));
            }
        }
        HierarchySummary {
            combo_count,
            category_count,
            test_count,
            unique_test_count: unique.len(),
            unique_tests: unique.into_iter().collect(),
        }
    }
}

/// Overview counts of the regression-test framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchySummary {
    /// Unique app/physics-suite builds.
    pub combo_count: usize,
    /// Build × test-type categories.
    pub category_count: usize,
    /// Tests executed when every build runs its full list.
    pub test_count: usize,
    pub unique_test_count: usize,
    pub unique_tests: Vec<String>,
}
