use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config_records::{ConfigTable, DatasetInfo, FieldInfo, PreProcInfo, TableInfo};
use super::onboarding::{OnboardingRequest, ScriptKind};

/// Editable template sheets, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SheetKind {
    #[serde(rename = "sys_config_dataset_info")]
    DatasetInfo,
    #[serde(rename = "sys_config_pre_proc_info")]
    PreProcInfo,
    #[serde(rename = "sys_config_table_info")]
    TableInfo,
    #[serde(rename = "sys_config_table_field_info")]
    TableFieldInfo,
}

impl SheetKind {
    pub const ALL: [SheetKind; 4] = [
        SheetKind::DatasetInfo,
        SheetKind::PreProcInfo,
        SheetKind::TableInfo,
        SheetKind::TableFieldInfo,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            SheetKind::DatasetInfo => "sys_config_dataset_info",
            SheetKind::PreProcInfo => "sys_config_pre_proc_info",
            SheetKind::TableInfo => "sys_config_table_info",
            SheetKind::TableFieldInfo => "sys_config_table_field_info",
        }
    }
}

/// The four configuration sheets shown to the user for review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSheets {
    pub dataset_info: Vec<DatasetInfo>,
    pub pre_proc_info: Vec<PreProcInfo>,
    pub table_info: Vec<TableInfo>,
    pub field_info: Vec<FieldInfo>,
}

impl TemplateSheets {
    /// Sheets as insert-ready tables under `schema`, in `SheetKind::ALL` order
    pub fn config_tables(&self, schema: &str) -> Vec<ConfigTable> {
        SheetKind::ALL
            .iter()
            .map(|kind| self.config_table(*kind, schema))
            .collect()
    }

    pub fn config_table(&self, kind: SheetKind, schema: &str) -> ConfigTable {
        match kind {
            SheetKind::DatasetInfo => ConfigTable::from_records(schema, &self.dataset_info),
            SheetKind::PreProcInfo => ConfigTable::from_records(schema, &self.pre_proc_info),
            SheetKind::TableInfo => ConfigTable::from_records(schema, &self.table_info),
            SheetKind::TableFieldInfo => ConfigTable::from_records(schema, &self.field_info),
        }
    }
}

/// A single cell change made while reviewing a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowEdit {
    /// 0-based row index within the sheet
    pub row: usize,
    pub column: String,
    pub value: serde_json::Value,
}

/// Pending edits keyed by sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateEdits(pub BTreeMap<SheetKind, Vec<RowEdit>>);

impl TemplateEdits {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn push(&mut self, sheet: SheetKind, edit: RowEdit) {
        self.0.entry(sheet).or_default().push(edit);
    }
}

/// Land DDL, stage DDL and configuration inserts for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScripts {
    pub land: String,
    pub stage: String,
    pub rds: String,
}

impl GeneratedScripts {
    pub fn get(&self, kind: ScriptKind) -> &str {
        match kind {
            ScriptKind::Land => &self.land,
            ScriptKind::Stage => &self.stage,
            ScriptKind::Rds => &self.rds,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScriptKind, &str)> {
        ScriptKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Request-scoped state carried between onboarding steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingContext {
    pub request: OnboardingRequest,
    pub sheets: TemplateSheets,
    #[serde(default)]
    pub scripts: Option<GeneratedScripts>,
}

impl OnboardingContext {
    pub fn new(request: OnboardingRequest, sheets: TemplateSheets) -> Self {
        Self {
            request,
            sheets,
            scripts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edits_deserialize_by_sheet_name() {
        let edits: TemplateEdits = serde_json::from_value(json!({
            "sys_config_table_field_info": [
                { "row": 0, "column": "key_ind", "value": "Y" }
            ]
        }))
        .unwrap();

        let field_edits = edits.0.get(&SheetKind::TableFieldInfo).unwrap();
        assert_eq!(field_edits[0].column, "key_ind");
        assert!(!edits.is_empty());
    }

    #[test]
    fn test_scripts_iterate_in_kind_order() {
        let scripts = GeneratedScripts {
            land: "a".to_string(),
            stage: "b".to_string(),
            rds: "c".to_string(),
        };
        let kinds: Vec<_> = scripts.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, ScriptKind::ALL.to_vec());
    }
}
