use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::OnboardingRequest;

pub const DEFAULT_CONFIG_FILE: &str = "onboarding.toml";
pub const ENV_PREFIX: &str = "ONBOARDING_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub rds: RdsConfig,
    pub defaults: DatasetDefaults,
    pub catalog: CatalogConfig,
    pub publish: PublishConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Defaults, then the TOML file, then `ONBOARDING_*` variables.
    ///
    /// A `.env` file is read first. An explicit `path` must exist; the default
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::ConfigError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where generated scripts are written
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("temp"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdsConfig {
    /// Schema holding the pipeline configuration tables
    pub schema: String,
}

impl Default for RdsConfig {
    fn default() -> Self {
        Self {
            schema: "app_mgmt".to_string(),
        }
    }
}

/// Operational defaults stamped into every dataset-info row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefaults {
    pub file_qty: i64,
    pub file_range_min: i64,
    pub serv_now_priorty_cd: String,
    pub sla_runtm_second: i64,
    pub serv_now_group_nm: String,
    pub err_notfcn_email_nm: String,
    pub notfcn_email_nm: String,
    pub virt_env_cd: String,
}

impl Default for DatasetDefaults {
    fn default() -> Self {
        Self {
            file_qty: 1,
            file_range_min: 30,
            serv_now_priorty_cd: "P4".to_string(),
            sla_runtm_second: 0,
            serv_now_group_nm: "kortex_nga_aws.global.l2".to_string(),
            err_notfcn_email_nm: "Non-Production_Kortex_AWS_Alerts@kellogg.com".to_string(),
            notfcn_email_nm: String::new(),
            virt_env_cd: "preproc".to_string(),
        }
    }
}

/// Allowed values for the request's select fields; an empty list allows anything
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub sources: Vec<String>,
    pub domains: Vec<String>,
    pub format_types: Vec<String>,
    pub deprecation_methods: Vec<String>,
    pub classifications: Vec<String>,
    pub warehouses: Vec<String>,
}

impl CatalogConfig {
    pub fn check(&self, request: &OnboardingRequest) -> Result<()> {
        check_listed("source name", &request.src_nm, &self.sources)?;
        check_listed("domain name", &request.domn_nm, &self.domains)?;
        check_listed("format type", &request.fmt_type_cd, &self.format_types)?;
        check_listed(
            "deprecation method",
            &request.dprct_methd_cd,
            &self.deprecation_methods,
        )?;
        check_listed(
            "data classification",
            &request.data_clasfctn_nm,
            &self.classifications,
        )?;
        check_listed("warehouse", &request.warehouse_nm, &self.warehouses)
    }
}

fn check_listed(label: &str, value: &str, allowed: &[String]) -> Result<()> {
    if allowed.is_empty() || allowed.iter().any(|a| a == value) {
        return Ok(());
    }
    Err(AppError::ValidationError(format!(
        "Unknown {} '{}'; expected one of: {}",
        label,
        value,
        allowed.join(", ")
    )))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const SOURCES: &[&str] = &[
    "fin_user",
    "smrt_fctry",
    "comrcl_user",
    "keu_bw",
    "eu_nielsen",
    "anaplan",
    "kg_bw_bpc",
    "tpm_optmztn",
    "b_and_m_user",
    "kna_ecc",
    "keu_ecc",
    "keu_scm",
    "sc_user",
    "sif",
    "eu_ktie",
];

const EXTRA_DOMAINS: &[&str] = &[
    "sales_prfmnc_eval",
    "mktg_start_plan",
    "info_sec_mgmt",
    "vndr_mstr",
    "cust_mstr",
    "qual_mgmt",
    "sales_exec",
    "sales_order_mgmt",
    "sc_plan",
    "prcurmt",
    "sales_strat_plan",
    "fndtn",
    "log_exec",
    "matrl_mstr",
    "curr_mstr",
    "fin_plan_analys",
    "price_allwnc_mstr",
    "log",
    "loc_mstr",
    "fin_acctg_ops",
];

impl Default for CatalogConfig {
    fn default() -> Self {
        let mut domains = strings(SOURCES);
        domains.extend(strings(EXTRA_DOMAINS));

        Self {
            sources: strings(SOURCES),
            domains,
            format_types: strings(&["csv", "excel", "txt", "zip", "json", "parquet", "orc"]),
            deprecation_methods: strings(&[
                "okrdra",
                "orrrra",
                "okkkra",
                "okkkra_extrctr",
                "okkkka",
                "file_cntl_upsrt_repl",
            ]),
            classifications: strings(&["confd", "intrnl"]),
            warehouses: strings(&[
                "keu_it_small",
                "keu_fin_small",
                "keu_elt_analytic_small",
                "keu_elt_supplychain_small",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Local clone the scripts are committed into
    pub repo_dir: PathBuf,
    pub remote_host: String,
    pub owner: String,
    pub repo: String,
    pub api_base_url: String,
    /// Branch merge requests target
    pub target_branch: String,
    pub username_env: String,
    pub token_env: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            remote_host: "github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            api_base_url: "https://api.github.com".to_string(),
            target_branch: "dev".to_string(),
            username_env: "GIT_USERNAME".to_string(),
            token_env: "GIT_TOKEN".to_string(),
        }
    }
}

impl PublishConfig {
    /// Reads the username/token pair from the configured variables
    pub fn credentials(&self) -> Result<GitCredentials> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    AppError::ConfigError(format!("Environment variable {} is not set", name))
                })
        };

        Ok(GitCredentials {
            username: read(&self.username_env)?,
            token: read(&self.token_env)?,
        })
    }

    pub fn ensure_remote(&self) -> Result<()> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(AppError::ConfigError(
                "publish.owner and publish.repo must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct GitCredentials {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}
