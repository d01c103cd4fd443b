//! Populate definitions and their classification.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::projection::Selection;

/// Explicit join direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateType {
    Forward,
    Reverse,
}

/// One relation to attach
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateSpec {
    /// Foreign-key path on the primary documents (forward join)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Path on the related documents pointing back at the primary id
    /// (reverse join)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    pub collection: String,

    #[serde(default)]
    pub select: Selection,

    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PopulateType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub populate: Vec<PopulateSpec>,
}

/// A populate spec resolved to a concrete join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPlan<'a> {
    Forward { field: &'a str },
    Reverse { link: &'a str },
}

impl PopulateSpec {
    pub fn forward(field: &str, collection: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            collection: collection.to_string(),
            ..Default::default()
        }
    }

    pub fn reverse(link: &str, collection: &str) -> Self {
        Self {
            link: Some(link.to_string()),
            collection: collection.to_string(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }

    pub fn with_nested(mut self, nested: PopulateSpec) -> Self {
        self.populate.push(nested);
        self
    }

    /// Decode a list of specs from a JSON array or a single object.
    pub fn list_from_json(json: &JsonValue) -> Result<Vec<Self>, serde_json::Error> {
        match json {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(_) => serde_json::from_value(json.clone()),
            _ => serde_json::from_value(json.clone()).map(|spec| vec![spec]),
        }
    }

    /// Decide the join direction, or explain why the spec is unusable.
    pub fn plan(&self) -> Result<JoinPlan<'_>, String> {
        if self.collection.trim().is_empty() {
            return Err("populate spec has no collection".to_string());
        }
        let field = self.field.as_deref().filter(|f| !f.is_empty());
        let link = self.link.as_deref().filter(|l| !l.is_empty());

        match (self.kind, field, link) {
            (Some(PopulateType::Forward), Some(field), _) => Ok(JoinPlan::Forward { field }),
            (Some(PopulateType::Forward), None, _) => {
                Err("forward populate requires a field".to_string())
            }
            (Some(PopulateType::Reverse), _, Some(link)) => Ok(JoinPlan::Reverse { link }),
            (Some(PopulateType::Reverse), _, None) => {
                Err("reverse populate requires a link".to_string())
            }
            (None, Some(field), None) => Ok(JoinPlan::Forward { field }),
            (None, None, Some(link)) => Ok(JoinPlan::Reverse { link }),
            (None, Some(_), Some(_)) => {
                Err("populate spec sets both field and link without a type".to_string())
            }
            (None, None, None) => Err("populate spec needs a field or a link".to_string()),
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self.plan(), Ok(JoinPlan::Reverse { .. }))
    }

    /// Key the related data is written to.
    pub fn target_field(&self) -> &str {
        if let Some(alias) = self.alias.as_deref().filter(|a| !a.is_empty()) {
            return alias;
        }
        match self.plan() {
            Ok(JoinPlan::Forward { field }) => field,
            _ => &self.collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wire_shape() {
        let specs = PopulateSpec::list_from_json(&json!([{
            "field": "vendorId",
            "collection": "vendors",
            "as": "vendor",
            "select": "name,rating",
            "populate": [{"link": "vendorId", "collection": "services"}]
        }]))
        .unwrap();

        let spec = &specs[0];
        assert_eq!(spec.alias.as_deref(), Some("vendor"));
        assert_eq!(
            spec.select,
            Selection::Fields(vec!["name".into(), "rating".into()])
        );
        assert_eq!(spec.populate.len(), 1);
        assert!(spec.populate[0].is_reverse());
    }

    #[test]
    fn test_single_object_is_accepted() {
        let specs =
            PopulateSpec::list_from_json(&json!({"field": "clientId", "collection": "users"})).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].select, Selection::All);
    }

    #[test]
    fn test_plan_classification() {
        assert_eq!(
            PopulateSpec::forward("vendorId", "vendors").plan(),
            Ok(JoinPlan::Forward { field: "vendorId" })
        );
        assert_eq!(
            PopulateSpec::reverse("vendorId", "services").plan(),
            Ok(JoinPlan::Reverse { link: "vendorId" })
        );

        let mut both = PopulateSpec::forward("vendorId", "vendors");
        both.link = Some("ownerId".into());
        assert!(both.plan().is_err());

        both.kind = Some(PopulateType::Reverse);
        assert_eq!(both.plan(), Ok(JoinPlan::Reverse { link: "ownerId" }));

        let neither = PopulateSpec {
            collection: "x".into(),
            ..Default::default()
        };
        assert!(neither.plan().is_err());
    }

    #[test]
    fn test_target_field_defaults() {
        assert_eq!(PopulateSpec::forward("vendorId", "vendors").target_field(), "vendorId");
        assert_eq!(PopulateSpec::reverse("vendorId", "services").target_field(), "services");
        assert_eq!(
            PopulateSpec::reverse("vendorId", "services")
                .with_alias("offers")
                .target_field(),
            "offers"
        );
    }
}
