// ============================================================
// SCRIPT GENERATOR
// ============================================================
// Assemble DDL and configuration inserts from template sheets

use crate::domain::config_records::{ConfigTable, FieldInfo};
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::DatasetNaming;
use crate::domain::template::{GeneratedScripts, TemplateSheets};

pub const LAND_SCHEMA: &str = "land";
pub const STAGE_SCHEMA: &str = "stage";

/// `CREATE TABLE` for the field rows, named after the first row's source table.
pub fn generate_table_definition(
    fields: &[FieldInfo],
    schema: &str,
    naming: &DatasetNaming,
) -> Result<String> {
    let first = fields.first().ok_or(AppError::EmptyMetadata)?;

    let columns: Vec<String> = fields
        .iter()
        .map(|field| {
            let mut definition = format!("{} {}", field.field_nm, field.datatype_nm);
            if field.is_primary_key() {
                definition.push_str(" PRIMARY KEY");
            }
            definition
        })
        .collect();

    Ok(format!(
        "CREATE TABLE {} (\n{}\n);",
        naming.qualified_table(schema, &first.src_table_nm),
        columns.join(",\n")
    ))
}

/// One multi-row `INSERT` per table, separated by blank lines.
///
/// Tables without rows get a comment placeholder.
pub fn generate_insert_statements(tables: &[ConfigTable]) -> String {
    tables
        .iter()
        .map(insert_statement)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn insert_statement(table: &ConfigTable) -> String {
    if table.is_empty() {
        return format!("-- No data to insert into {}", table.name);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(|v| v.to_sql_literal()).collect();
            format!("({})", values.join(", "))
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "INSERT INTO {} ({}) VALUES\n{};",
        table.name,
        table.columns.join(", "),
        rows
    )
}

/// All three artifacts; fails before producing any when field info is empty.
pub fn generate_scripts(
    sheets: &TemplateSheets,
    naming: &DatasetNaming,
    rds_schema: &str,
) -> Result<GeneratedScripts> {
    let land = generate_table_definition(&sheets.field_info, LAND_SCHEMA, naming)?;
    let stage = generate_table_definition(&sheets.field_info, STAGE_SCHEMA, naming)?;
    let rds = generate_insert_statements(&sheets.config_tables(rds_schema));

    Ok(GeneratedScripts { land, stage, rds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config_records::SqlValue;
    use crate::domain::error::EMPTY_METADATA_MESSAGE;

    fn field(name: &str, datatype: &str, key: bool) -> FieldInfo {
        FieldInfo {
            src_nm: "src".to_string(),
            src_table_nm: "t".to_string(),
            field_nm: name.to_string(),
            field_posn_nbr: 1,
            datatype_nm: datatype.to_string(),
            datatype_size_val: None,
            datatype_scale_val: None,
            key_ind: if key { "Y".to_string() } else { String::new() },
            check_table: String::new(),
            field_desc: String::new(),
            dprct_ind: String::new(),
            partitn_ind: String::new(),
            sort_key_ind: String::new(),
            dist_key_ind: String::new(),
            proc_stage_cd: String::new(),
            catlg_flg: String::new(),
            dblqt_repl_flg: String::new(),
            delta_key_ind: String::new(),
        }
    }

    #[test]
    fn test_table_definition_exact_output() {
        let fields = vec![
            field("id", "NUMBER(38,0)", true),
            field("nm", "VARCHAR(255)", false),
        ];
        let naming = DatasetNaming::new("src", "ds");

        let sql = generate_table_definition(&fields, "land", &naming).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE land.src_ds_t (\nid NUMBER(38,0) PRIMARY KEY,\nnm VARCHAR(255)\n);"
        );
    }

    #[test]
    fn test_empty_metadata_is_rejected() {
        let naming = DatasetNaming::new("src", "ds");
        let err = generate_table_definition(&[], "land", &naming).unwrap_err();

        assert!(matches!(err, AppError::EmptyMetadata));
        assert_eq!(err.to_string(), EMPTY_METADATA_MESSAGE);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let sheets = TemplateSheets {
            field_info: vec![field("id", "NUMBER(38,0)", true)],
            ..Default::default()
        };
        let naming = DatasetNaming::new("src", "ds");

        let first = generate_scripts(&sheets, &naming, "app_mgmt").unwrap();
        let second = generate_scripts(&sheets, &naming, "app_mgmt").unwrap();
        assert_eq!(first, second);
        assert!(first.stage.starts_with("CREATE TABLE stage.src_ds_t ("));
    }

    #[test]
    fn test_insert_statements_render_rows_and_placeholders() {
        let tables = vec![
            ConfigTable {
                name: "app_mgmt.a".to_string(),
                columns: vec!["x".to_string(), "y".to_string()],
                rows: vec![
                    vec![SqlValue::Int(1), SqlValue::Null],
                    vec![SqlValue::Int(2), SqlValue::from("it's")],
                ],
            },
            ConfigTable {
                name: "app_mgmt.b".to_string(),
                columns: vec!["x".to_string()],
                rows: Vec::new(),
            },
        ];

        assert_eq!(
            generate_insert_statements(&tables),
            "INSERT INTO app_mgmt.a (x, y) VALUES\n(1, NULL),\n(2, 'it''s');\n\n\
             -- No data to insert into app_mgmt.b"
        );
    }

    #[test]
    fn test_scripts_abort_without_fields() {
        let naming = DatasetNaming::new("src", "ds");
        let result = generate_scripts(&TemplateSheets::default(), &naming, "app_mgmt");
        assert!(matches!(result, Err(AppError::EmptyMetadata)));
    }
}
