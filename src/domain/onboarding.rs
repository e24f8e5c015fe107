use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// Warehouse the dataset is loaded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetDialect {
    Snowflake,
    Redshift,
}

impl Default for TargetDialect {
    fn default() -> Self {
        Self::Snowflake
    }
}

impl fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDialect::Snowflake => write!(f, "Snowflake"),
            TargetDialect::Redshift => write!(f, "Redshift"),
        }
    }
}

/// Everything the user fills in before uploading a sample
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OnboardingRequest {
    #[validate(regex(path = *IDENTIFIER_RE, message = "source name must be an identifier"))]
    pub src_nm: String,

    pub domn_nm: String,

    #[validate(regex(path = *IDENTIFIER_RE, message = "dataset name must be an identifier"))]
    pub dataset_nm: String,

    #[validate(regex(path = *IDENTIFIER_RE, message = "table name must be an identifier"))]
    pub table_nm: String,

    #[serde(default = "default_format_type")]
    pub fmt_type_cd: String,

    #[serde(default)]
    pub delmtr_cd: String,

    #[validate(length(min = 1, message = "deprecation method is required"))]
    pub dprct_methd_cd: String,

    #[validate(length(min = 1, message = "data classification is required"))]
    pub data_clasfctn_nm: String,

    #[serde(default)]
    pub dialect: TargetDialect,

    #[validate(length(min = 1, message = "warehouse is required"))]
    pub warehouse_nm: String,
}

fn default_format_type() -> String {
    "csv".to_string()
}

impl OnboardingRequest {
    pub fn naming(&self) -> DatasetNaming {
        DatasetNaming::new(&self.src_nm, &self.dataset_nm)
    }
}

/// Generated artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Land,
    Stage,
    Rds,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 3] = [ScriptKind::Land, ScriptKind::Stage, ScriptKind::Rds];

    pub fn suffix(&self) -> &'static str {
        match self {
            ScriptKind::Land => "land",
            ScriptKind::Stage => "stage",
            ScriptKind::Rds => "rds",
        }
    }
}

/// Naming conventions shared by files, tables, branches and folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetNaming {
    pub src_nm: String,
    pub dataset_nm: String,
}

impl DatasetNaming {
    pub fn new(src_nm: impl Into<String>, dataset_nm: impl Into<String>) -> Self {
        Self {
            src_nm: src_nm.into(),
            dataset_nm: dataset_nm.into(),
        }
    }

    /// `<source>_<dataset>`
    pub fn prefix(&self) -> String {
        format!("{}_{}", self.src_nm, self.dataset_nm)
    }

    pub fn qualified_table(&self, schema: &str, table: &str) -> String {
        format!("{}.{}_{}", schema, self.prefix(), table)
    }

    pub fn script_file_name(&self, kind: ScriptKind) -> String {
        format!("{}_{}.sql", self.prefix(), kind.suffix())
    }

    pub fn archive_name(&self) -> String {
        format!("{}_Onboarding_Files.zip", self.prefix())
    }

    /// Workbook holding one worksheet per configuration sheet
    pub fn template_file_name(&self) -> String {
        format!("{}_onboarding_template.xlsx", self.prefix())
    }

    /// Folder the scripts are committed under; `stamp` is `%Y%m%d%H%M%S`
    pub fn folder_name(&self, stamp: &str) -> String {
        format!("{}_{}", self.prefix(), stamp)
    }

    pub fn branch_name(&self, stamp: &str) -> String {
        format!("feature/{}", self.folder_name(stamp))
    }
}

#[cfg(test)]
pub(crate) fn sample_request() -> OnboardingRequest {
    OnboardingRequest {
        src_nm: "src".to_string(),
        domn_nm: "fin_user".to_string(),
        dataset_nm: "ds".to_string(),
        table_nm: "t".to_string(),
        fmt_type_cd: "csv".to_string(),
        delmtr_cd: ",".to_string(),
        dprct_methd_cd: "okrdra".to_string(),
        data_clasfctn_nm: "intrnl".to_string(),
        dialect: TargetDialect::Snowflake,
        warehouse_nm: "keu_it_small".to_string(),
    }
}
