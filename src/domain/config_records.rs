// ============================================================
// CONFIGURATION RECORDS
// ============================================================
// Typed rows for the ingestion pipeline's configuration tables

use serde::{Deserialize, Serialize};

/// A single cell destined for an INSERT statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
}

impl SqlValue {
    /// SQL literal: `NULL`, bare integer, or single-quoted text
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(value) => value.to_string(),
            SqlValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        value.map(SqlValue::Int).unwrap_or(SqlValue::Null)
    }
}

/// A row type mapped onto one configuration table
pub trait ConfigRecord {
    /// Unqualified table name
    const TABLE: &'static str;

    fn columns() -> &'static [&'static str];

    /// Cell values, in `columns()` order
    fn values(&self) -> Vec<SqlValue>;
}

/// Column names plus rows, ready for script generation
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTable {
    /// Schema-qualified table name
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ConfigTable {
    pub fn from_records<R: ConfigRecord>(schema: &str, records: &[R]) -> Self {
        Self {
            name: format!("{}.{}", schema, R::TABLE),
            columns: R::columns().iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(ConfigRecord::values).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub src_nm: String,
    pub dataset_nm: String,
    pub file_qty: i64,
    pub file_range_min: i64,
    pub pre_proc_flg: String,
    pub serv_now_priorty_cd: String,
    pub sla_runtm_second: i64,
    pub serv_now_group_nm: String,
    pub err_notfcn_email_nm: String,
    pub notfcn_email_nm: String,
    pub virt_env_cd: String,
    pub proc_stage_cd: String,
    pub catlg_flg: String,
    pub trgt_dw_list: String,
    pub cmput_whse_nm: String,
    pub manl_upld_s3_uri_txt: String,
    pub manl_upld_flg: String,
}

impl ConfigRecord for DatasetInfo {
    const TABLE: &'static str = "sys_config_dataset_info";

    fn columns() -> &'static [&'static str] {
        &[
            "src_nm",
            "dataset_nm",
            "file_qty",
            "file_range_min",
            "pre_proc_flg",
            "serv_now_priorty_cd",
            "sla_runtm_second",
            "serv_now_group_nm",
            "err_notfcn_email_nm",
            "notfcn_email_nm",
            "virt_env_cd",
            "proc_stage_cd",
            "catlg_flg",
            "trgt_dw_list",
            "cmput_whse_nm",
            "manl_upld_s3_uri_txt",
            "manl_upld_flg",
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.src_nm).into(),
            (&self.dataset_nm).into(),
            self.file_qty.into(),
            self.file_range_min.into(),
            (&self.pre_proc_flg).into(),
            (&self.serv_now_priorty_cd).into(),
            self.sla_runtm_second.into(),
            (&self.serv_now_group_nm).into(),
            (&self.err_notfcn_email_nm).into(),
            (&self.notfcn_email_nm).into(),
            (&self.virt_env_cd).into(),
            (&self.proc_stage_cd).into(),
            (&self.catlg_flg).into(),
            (&self.trgt_dw_list).into(),
            (&self.cmput_whse_nm).into(),
            (&self.manl_upld_s3_uri_txt).into(),
            (&self.manl_upld_flg).into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreProcInfo {
    pub src_nm: String,
    pub dataset_nm: String,
    pub file_patrn_txt: String,
    pub pre_proc_methd_val: String,
    pub file_qty: i64,
    pub fmt_type_cd: String,
}

impl ConfigRecord for PreProcInfo {
    const TABLE: &'static str = "sys_config_pre_proc_info";

    fn columns() -> &'static [&'static str] {
        &[
            "src_nm",
            "dataset_nm",
            "file_patrn_txt",
            "pre_proc_methd_val",
            "file_qty",
            "fmt_type_cd",
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.src_nm).into(),
            (&self.dataset_nm).into(),
            (&self.file_patrn_txt).into(),
            (&self.pre_proc_methd_val).into(),
            self.file_qty.into(),
            (&self.fmt_type_cd).into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub src_nm: String,
    pub domn_nm: String,
    pub dataset_nm: String,
    pub redshift_table_nm: String,
    pub src_table_nm: String,
    pub data_clasfctn_nm: String,
    pub file_qty: i64,
    pub fmt_type_cd: String,
    pub delmtr_cd: String,
    pub file_patrn_txt: String,
    pub dprct_methd_cd: String,
    pub load_enbl_flg: String,
    pub file_hdr_cnt: i64,
    pub pre_proc_flg: String,
    pub pre_proc_cd: String,
    pub src_encod_cd: String,
    pub src_chrset_cd: String,
    pub src_newln_chr_cd: String,
    pub proc_stage_cd: String,
    pub catlg_flg: String,
    pub dprct_selct_critra_txt: String,
    pub bypas_file_order_seq_check_ind: String,
    pub land_spctrm_flg: String,
    pub wrkflw_nm: String,
    pub copy_by_field_nm_not_posn_ind: String,
    pub bypas_file_hdr_config_posn_check_ind: String,
    pub bypas_file_hdr_config_check_ind: String,
}

impl ConfigRecord for TableInfo {
    const TABLE: &'static str = "sys_config_table_info";

    fn columns() -> &'static [&'static str] {
        &[
            "src_nm",
            "domn_nm",
            "dataset_nm",
            "redshift_table_nm",
            "src_table_nm",
            "data_clasfctn_nm",
            "file_qty",
            "fmt_type_cd",
            "delmtr_cd",
            "file_patrn_txt",
            "dprct_methd_cd",
            "load_enbl_flg",
            "file_hdr_cnt",
            "pre_proc_flg",
            "pre_proc_cd",
            "src_encod_cd",
            "src_chrset_cd",
            "src_newln_chr_cd",
            "proc_stage_cd",
            "catlg_flg",
            "dprct_selct_critra_txt",
            "bypas_file_order_seq_check_ind",
            "land_spctrm_flg",
            "wrkflw_nm",
            "copy_by_field_nm_not_posn_ind",
            "bypas_file_hdr_config_posn_check_ind",
            "bypas_file_hdr_config_check_ind",
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.src_nm).into(),
            (&self.domn_nm).into(),
            (&self.dataset_nm).into(),
            (&self.redshift_table_nm).into(),
            (&self.src_table_nm).into(),
            (&self.data_clasfctn_nm).into(),
            self.file_qty.into(),
            (&self.fmt_type_cd).into(),
            (&self.delmtr_cd).into(),
            (&self.file_patrn_txt).into(),
            (&self.dprct_methd_cd).into(),
            (&self.load_enbl_flg).into(),
            self.file_hdr_cnt.into(),
            (&self.pre_proc_flg).into(),
            (&self.pre_proc_cd).into(),
            (&self.src_encod_cd).into(),
            (&self.src_chrset_cd).into(),
            (&self.src_newln_chr_cd).into(),
            (&self.proc_stage_cd).into(),
            (&self.catlg_flg).into(),
            (&self.dprct_selct_critra_txt).into(),
            (&self.bypas_file_order_seq_check_ind).into(),
            (&self.land_spctrm_flg).into(),
            (&self.wrkflw_nm).into(),
            (&self.copy_by_field_nm_not_posn_ind).into(),
            (&self.bypas_file_hdr_config_posn_check_ind).into(),
            (&self.bypas_file_hdr_config_check_ind).into(),
        ]
    }
}

/// Key indicator marking a primary-key column
pub const KEY_IND_PRIMARY: &str = "Y";

/// Column metadata row; doubles as the DDL source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub src_nm: String,
    pub src_table_nm: String,
    pub field_nm: String,
    pub field_posn_nbr: i64,
    pub datatype_nm: String,
    pub datatype_size_val: Option<i64>,
    pub datatype_scale_val: Option<i64>,
    pub key_ind: String,
    pub check_table: String,
    pub field_desc: String,
    pub dprct_ind: String,
    pub partitn_ind: String,
    pub sort_key_ind: String,
    pub dist_key_ind: String,
    pub proc_stage_cd: String,
    pub catlg_flg: String,
    pub dblqt_repl_flg: String,
    pub delta_key_ind: String,
}

impl FieldInfo {
    pub fn is_primary_key(&self) -> bool {
        self.key_ind.trim().eq_ignore_ascii_case(KEY_IND_PRIMARY)
    }
}

impl ConfigRecord for FieldInfo {
    const TABLE: &'static str = "sys_config_table_field_info";

    fn columns() -> &'static [&'static str] {
        &[
            "src_nm",
            "src_table_nm",
            "field_nm",
            "field_posn_nbr",
            "datatype_nm",
            "datatype_size_val",
            "datatype_scale_val",
            "key_ind",
            "check_table",
            "field_desc",
            "dprct_ind",
            "partitn_ind",
            "sort_key_ind",
            "dist_key_ind",
            "proc_stage_cd",
            "catlg_flg",
            "dblqt_repl_flg",
            "delta_key_ind",
        ]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.src_nm).into(),
            (&self.src_table_nm).into(),
            (&self.field_nm).into(),
            self.field_posn_nbr.into(),
            (&self.datatype_nm).into(),
            self.datatype_size_val.into(),
            self.datatype_scale_val.into(),
            (&self.key_ind).into(),
            (&self.check_table).into(),
            (&self.field_desc).into(),
            (&self.dprct_ind).into(),
            (&self.partitn_ind).into(),
            (&self.sort_key_ind).into(),
            (&self.dist_key_ind).into(),
            (&self.proc_stage_cd).into(),
            (&self.catlg_flg).into(),
            (&self.dblqt_repl_flg).into(),
            (&self.delta_key_ind).into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_literals() {
        assert_eq!(SqlValue::Null.to_sql_literal(), "NULL");
        assert_eq!(SqlValue::Int(30).to_sql_literal(), "30");
        assert_eq!(SqlValue::from("").to_sql_literal(), "''");
        assert_eq!(SqlValue::from("O'Brien").to_sql_literal(), "'O''Brien'");
    }

    #[test]
    fn test_columns_match_values() {
        let pre_proc = PreProcInfo {
            src_nm: "src".to_string(),
            dataset_nm: "ds".to_string(),
            file_patrn_txt: String::new(),
            pre_proc_methd_val: String::new(),
            file_qty: 0,
            fmt_type_cd: String::new(),
        };

        let table = ConfigTable::from_records("app_mgmt", &[pre_proc]);
        assert_eq!(table.name, "app_mgmt.sys_config_pre_proc_info");
        assert_eq!(table.columns.len(), table.rows[0].len());
    }
}
