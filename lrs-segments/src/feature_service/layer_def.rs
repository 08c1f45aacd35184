//! Encoding of the `layerDefs` query parameter.

use serde::Serialize;

/// Filter and field list for one layer of a multi-layer query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDef {
    pub layer_id: i64,
    pub where_clause: String,
    pub out_fields: Vec<String>,
}

impl LayerDef {
    pub fn new(layer_id: i64, where_clause: impl Into<String>, out_fields: Vec<String>) -> Self {
        Self {
            layer_id,
            where_clause: where_clause.into(),
            out_fields,
        }
    }

    /// A definition that only filters and returns the service's default fields.
    pub fn simple(layer_id: i64, where_clause: impl Into<String>) -> Self {
        Self::new(layer_id, where_clause, Vec::new())
    }

    pub fn is_simple(&self) -> bool {
        self.out_fields.is_empty()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireLayerDef<'a> {
    layer_id: i64,
    #[serde(rename = "where")]
    where_clause: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_fields: Option<String>,
}

/// The layer definitions of one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerDefs(pub Vec<LayerDef>);

impl LayerDefs {
    /// `id:where,id:where` when every definition is simple, a JSON array
    /// otherwise.
    pub fn to_param(&self) -> String {
        if self.0.iter().all(LayerDef::is_simple) {
            return self
                .0
                .iter()
                .map(|ld| format!("{}:{}", ld.layer_id, ld.where_clause))
                .collect::<Vec<_>>()
                .join(",");
        }

        let wire: Vec<WireLayerDef<'_>> = self
            .0
            .iter()
            .map(|ld| WireLayerDef {
                layer_id: ld.layer_id,
                where_clause: &ld.where_clause,
                out_fields: (!ld.out_fields.is_empty()).then(|| ld.out_fields.join(",")),
            })
            .collect();

        // Serializing strings and integers cannot fail.
        serde_json::to_string(&wire).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDef> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_format() {
        let defs = LayerDefs(vec![
            LayerDef::simple(0, "RouteID = '002'"),
            LayerDef::simple(1, "RouteIdentifier LIKE '002_'"),
        ]);
        assert_eq!(
            defs.to_param(),
            "0:RouteID = '002',1:RouteIdentifier LIKE '002_'"
        );
    }

    #[test]
    fn json_format_when_fields_given() {
        let defs = LayerDefs(vec![
            LayerDef::new(0, "RouteID = '002'", vec!["RouteID".into(), "SRMP".into()]),
            LayerDef::simple(1, "RouteIdentifier = '002i'"),
        ]);
        let value: serde_json::Value = serde_json::from_str(&defs.to_param()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"layerId": 0, "where": "RouteID = '002'", "outFields": "RouteID,SRMP"},
                {"layerId": 1, "where": "RouteIdentifier = '002i'"}
            ])
        );
    }

    #[test]
    fn empty_defs() {
        assert_eq!(LayerDefs::default().to_param(), "");
    }
}
