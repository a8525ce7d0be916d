//! Inventory and variables models.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

/// Target-specific data attached to one dashboard entry.
pub type DashboardData = IndexMap<String, YamlValue>;

/// Extra variables, exposed to templating under the reserved `vars` key.
pub type Vars = IndexMap<String, YamlValue>;

/// The inventory: named dashboards and their data, in file order.
///
/// Iteration order drives target processing order, so the mapping is
/// insertion-ordered. Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Inventory {
    /// Dashboard name to target-specific data
    pub dashboards: IndexMap<String, DashboardData>,
}
