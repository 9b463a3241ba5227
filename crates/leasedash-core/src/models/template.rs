use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A report template. Hierarchy is expressed either by nested `children`
/// or by `parent_id` references within a flat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Template {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Template>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Template {
    /// Depth-first walk of a template list, yielding `(depth, template)`.
    ///
    /// Roots are templates without a parent in the list. Each template is
    /// visited once, so cyclic `parent_id` chains cannot loop; templates
    /// only reachable through a cycle are appended at depth 0.
    pub fn flatten(templates: &[Template]) -> Vec<(usize, &Template)> {
        let ids: HashSet<i64> = templates.iter().map(|t| t.id).collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for root in templates
            .iter()
            .filter(|t| t.parent_id.map_or(true, |p| !ids.contains(&p)))
        {
            Self::visit(root, 0, templates, &mut seen, &mut out);
        }
        for orphan in templates {
            if !seen.contains(&orphan.id) {
                Self::visit(orphan, 0, templates, &mut seen, &mut out);
            }
        }
        out
    }

    fn visit<'a>(
        template: &'a Template,
        depth: usize,
        all: &'a [Template],
        seen: &mut HashSet<i64>,
        out: &mut Vec<(usize, &'a Template)>,
    ) {
        if !seen.insert(template.id) {
            return;
        }
        out.push((depth, template));
        for child in &template.children {
            Self::visit(child, depth + 1, all, seen, out);
        }
        for child in all.iter().filter(|t| t.parent_id == Some(template.id)) {
            Self::visit(child, depth + 1, all, seen, out);
        }
    }
}
