// ============================================================
// TEMPLATE BUILDER
// ============================================================
// Fill the configuration sheets from a request and its sample

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::column::{InferredColumn, SampleTable};
use crate::domain::config_records::{DatasetInfo, FieldInfo, PreProcInfo, TableInfo, KEY_IND_PRIMARY};
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::OnboardingRequest;
use crate::domain::template::{RowEdit, SheetKind, TemplateEdits, TemplateSheets};
use crate::infrastructure::config::DatasetDefaults;

use super::type_inference::infer_table;

pub struct TemplateBuilder {
    defaults: DatasetDefaults,
}

impl TemplateBuilder {
    pub fn new(defaults: DatasetDefaults) -> Self {
        Self { defaults }
    }

    pub fn build(&self, request: &OnboardingRequest, sample: &SampleTable) -> TemplateSheets {
        let inferred = infer_table(sample);
        debug!(
            columns = inferred.len(),
            rows = sample.row_count,
            "Inferred sample columns"
        );

        TemplateSheets {
            dataset_info: vec![self.dataset_info(request)],
            pre_proc_info: vec![pre_proc_info(request)],
            table_info: vec![table_info(request)],
            field_info: inferred
                .iter()
                .map(|column| field_info(request, column))
                .collect(),
        }
    }

    fn dataset_info(&self, request: &OnboardingRequest) -> DatasetInfo {
        let defaults = &self.defaults;
        DatasetInfo {
            src_nm: request.src_nm.clone(),
            dataset_nm: request.dataset_nm.clone(),
            file_qty: defaults.file_qty,
            file_range_min: defaults.file_range_min,
            pre_proc_flg: "N".to_string(),
            serv_now_priorty_cd: defaults.serv_now_priorty_cd.clone(),
            sla_runtm_second: defaults.sla_runtm_second,
            serv_now_group_nm: defaults.serv_now_group_nm.clone(),
            err_notfcn_email_nm: defaults.err_notfcn_email_nm.clone(),
            notfcn_email_nm: defaults.notfcn_email_nm.clone(),
            virt_env_cd: defaults.virt_env_cd.clone(),
            proc_stage_cd: "Y".to_string(),
            catlg_flg: "Y".to_string(),
            trgt_dw_list: request.dialect.to_string(),
            cmput_whse_nm: request.warehouse_nm.clone(),
            manl_upld_s3_uri_txt: String::new(),
            manl_upld_flg: "N".to_string(),
        }
    }
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new(DatasetDefaults::default())
    }
}

fn pre_proc_info(request: &OnboardingRequest) -> PreProcInfo {
    PreProcInfo {
        src_nm: request.src_nm.clone(),
        dataset_nm: request.dataset_nm.clone(),
        file_patrn_txt: String::new(),
        pre_proc_methd_val: String::new(),
        file_qty: 0,
        fmt_type_cd: String::new(),
    }
}

fn table_info(request: &OnboardingRequest) -> TableInfo {
    TableInfo {
        src_nm: request.src_nm.clone(),
        domn_nm: request.domn_nm.clone(),
        dataset_nm: request.dataset_nm.clone(),
        redshift_table_nm: request.table_nm.clone(),
        src_table_nm: request.table_nm.clone(),
        data_clasfctn_nm: request.data_clasfctn_nm.clone(),
        file_qty: 0,
        fmt_type_cd: request.fmt_type_cd.clone(),
        delmtr_cd: request.delmtr_cd.clone(),
        file_patrn_txt: String::new(),
        dprct_methd_cd: request.dprct_methd_cd.clone(),
        load_enbl_flg: "Y".to_string(),
        file_hdr_cnt: 1,
        pre_proc_flg: "N".to_string(),
        pre_proc_cd: String::new(),
        src_encod_cd: String::new(),
        src_chrset_cd: String::new(),
        src_newln_chr_cd: String::new(),
        proc_stage_cd: "load".to_string(),
        catlg_flg: "Y".to_string(),
        dprct_selct_critra_txt: String::new(),
        bypas_file_order_seq_check_ind: "N".to_string(),
        land_spctrm_flg: String::new(),
        wrkflw_nm: String::new(),
        copy_by_field_nm_not_posn_ind: String::new(),
        bypas_file_hdr_config_posn_check_ind: String::new(),
        bypas_file_hdr_config_check_ind: String::new(),
    }
}

fn field_info(request: &OnboardingRequest, column: &InferredColumn) -> FieldInfo {
    let length = column.max_length.map(|len| len as i64);
    FieldInfo {
        src_nm: request.src_nm.clone(),
        src_table_nm: request.table_nm.clone(),
        field_nm: column.name.clone(),
        field_posn_nbr: column.position as i64,
        datatype_nm: column.column_type.sql_name().to_string(),
        datatype_size_val: length,
        datatype_scale_val: length,
        key_ind: if column.primary_key {
            KEY_IND_PRIMARY.to_string()
        } else {
            String::new()
        },
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

/// Apply reviewed cell edits to the sheets in place.
///
/// Edits are validated one by one; the first bad edit aborts and earlier
/// edits stay applied.
pub fn apply_edits(sheets: &mut TemplateSheets, edits: &TemplateEdits) -> Result<()> {
    for (sheet, sheet_edits) in &edits.0 {
        for edit in sheet_edits {
            match sheet {
                SheetKind::DatasetInfo => apply_row_edit(&mut sheets.dataset_info, *sheet, edit)?,
                SheetKind::PreProcInfo => apply_row_edit(&mut sheets.pre_proc_info, *sheet, edit)?,
                SheetKind::TableInfo => apply_row_edit(&mut sheets.table_info, *sheet, edit)?,
                SheetKind::TableFieldInfo => {
                    apply_row_edit(&mut sheets.field_info, *sheet, edit)?
                }
            }
        }
    }
    Ok(())
}

fn apply_row_edit<T>(rows: &mut [T], sheet: SheetKind, edit: &RowEdit) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let row_count = rows.len();
    let row = rows.get_mut(edit.row).ok_or_else(|| {
        AppError::ValidationError(format!(
            "{}: row {} out of range ({} rows)",
            sheet.sheet_name(),
            edit.row,
            row_count
        ))
    })?;

    let mut value = serde_json::to_value(&*row)
        .map_err(|e| AppError::Internal(format!("Failed to serialize row: {}", e)))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("Row did not serialize to an object".to_string()))?;

    if !object.contains_key(&edit.column) {
        return Err(AppError::ValidationError(format!(
            "{}: unknown column '{}'",
            sheet.sheet_name(),
            edit.column
        )));
    }
    object.insert(edit.column.clone(), edit.value.clone());

    *row = serde_json::from_value(value).map_err(|e| {
        AppError::ValidationError(format!(
            "{}: invalid value for '{}': {}",
            sheet.sheet_name(),
            edit.column,
            e
        ))
    })?;

    debug!(
        sheet = sheet.sheet_name(),
        row = edit.row,
        column = %edit.column,
        "Applied template edit"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::onboarding::sample_request;
    use serde_json::json;

    fn sample() -> SampleTable {
        SampleTable::from_rows(
            vec!["id".to_string(), "name".to_string(), "empty".to_string()],
            vec![
                vec![Some("1".to_string()), Some("alpha".to_string()), None],
                vec![Some("2".to_string()), Some("be".to_string()), None],
            ],
        )
    }

    #[test]
    fn test_build_fills_every_sheet() {
        let sheets = TemplateBuilder::default().build(&sample_request(), &sample());

        assert_eq!(sheets.dataset_info.len(), 1);
        assert_eq!(sheets.dataset_info[0].trgt_dw_list, "Snowflake");
        assert_eq!(sheets.dataset_info[0].file_range_min, 30);
        assert_eq!(sheets.table_info[0].src_table_nm, "t");
        assert_eq!(sheets.table_info[0].proc_stage_cd, "load");
        assert_eq!(sheets.field_info.len(), 3);
    }

    #[test]
    fn test_field_info_reflects_inference() {
        let sheets = TemplateBuilder::default().build(&sample_request(), &sample());
        let id = &sheets.field_info[0];
        let name = &sheets.field_info[1];
        let empty = &sheets.field_info[2];

        assert_eq!(id.datatype_nm, "NUMBER(38,0)");
        assert!(id.is_primary_key());
        assert_eq!(name.datatype_size_val, Some(5));
        assert_eq!(name.field_posn_nbr, 2);
        assert_eq!(empty.datatype_nm, "VARCHAR(255)");
        assert_eq!(empty.datatype_size_val, None);
        assert!(!empty.is_primary_key());
    }

    #[test]
    fn test_apply_edits_updates_typed_rows() {
        let mut sheets = TemplateBuilder::default().build(&sample_request(), &sample());
        let mut edits = TemplateEdits::default();
        edits.push(
            SheetKind::TableFieldInfo,
            RowEdit {
                row: 1,
                column: "key_ind".to_string(),
                value: json!("Y"),
            },
        );
        edits.push(
            SheetKind::DatasetInfo,
            RowEdit {
                row: 0,
                column: "file_qty".to_string(),
                value: json!(4),
            },
        );

        apply_edits(&mut sheets, &edits).unwrap();
        assert!(sheets.field_info[1].is_primary_key());
        assert_eq!(sheets.dataset_info[0].file_qty, 4);
    }

    #[test]
    fn test_apply_edits_rejects_bad_edits() {
        let mut sheets = TemplateBuilder::default().build(&sample_request(), &sample());

        let cases = vec![
            (SheetKind::TableInfo, 5, "src_nm", json!("x")),
            (SheetKind::TableInfo, 0, "no_such_column", json!("x")),
            (SheetKind::DatasetInfo, 0, "file_qty", json!("many")),
        ];

        for (sheet, row, column, value) in cases {
            let mut edits = TemplateEdits::default();
            edits.push(
                sheet,
                RowEdit {
                    row,
                    column: column.to_string(),
                    value,
                },
            );
            assert!(matches!(
                apply_edits(&mut sheets, &edits),
                Err(AppError::ValidationError(_))
            ));
        }
    }
}
