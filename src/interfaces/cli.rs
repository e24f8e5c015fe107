use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::application::use_cases::onboarding::OnboardingUseCase;
use crate::application::use_cases::publish::PublishUseCase;
use crate::application::use_cases::type_inference::infer_table;
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::{OnboardingRequest, TargetDialect};
use crate::domain::template::{OnboardingContext, TemplateEdits};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::sample::{load_sample, parse_delimiter};
use crate::infrastructure::storage;
use crate::infrastructure::vcs::GitHubPublisher;
use crate::interfaces::http::start_server;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DialectArg {
    Snowflake,
    Redshift,
}

impl From<DialectArg> for TargetDialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Snowflake => TargetDialect::Snowflake,
            DialectArg::Redshift => TargetDialect::Redshift,
        }
    }
}

/// Form fields describing the dataset being onboarded
#[derive(Debug, Args)]
pub struct RequestArgs {
    #[arg(long = "source", env = "DATAONBOARD_SOURCE")]
    pub src_nm: String,

    #[arg(long = "domain", env = "DATAONBOARD_DOMAIN")]
    pub domn_nm: String,

    #[arg(long = "dataset", env = "DATAONBOARD_DATASET")]
    pub dataset_nm: String,

    #[arg(long = "table", env = "DATAONBOARD_TABLE")]
    pub table_nm: String,

    #[arg(long = "format", default_value = "csv")]
    pub fmt_type_cd: String,

    /// Detected from the sample when omitted
    #[arg(long = "delimiter")]
    pub delmtr_cd: Option<String>,

    #[arg(long = "deprecation", env = "DATAONBOARD_DEPRECATION")]
    pub dprct_methd_cd: String,

    #[arg(long = "classification", env = "DATAONBOARD_CLASSIFICATION")]
    pub data_clasfctn_nm: String,

    #[arg(long, value_enum, default_value_t = DialectArg::Snowflake)]
    pub dialect: DialectArg,

    #[arg(long = "warehouse", env = "DATAONBOARD_WAREHOUSE")]
    pub warehouse_nm: String,
}

impl From<RequestArgs> for OnboardingRequest {
    fn from(args: RequestArgs) -> Self {
        OnboardingRequest {
            src_nm: args.src_nm,
            domn_nm: args.domn_nm,
            dataset_nm: args.dataset_nm,
            table_nm: args.table_nm,
            fmt_type_cd: args.fmt_type_cd,
            delmtr_cd: args.delmtr_cd.unwrap_or_default(),
            dprct_methd_cd: args.dprct_methd_cd,
            data_clasfctn_nm: args.data_clasfctn_nm,
            dialect: args.dialect.into(),
            warehouse_nm: args.warehouse_nm,
        }
    }
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Sample file (.xlsx, .csv or .txt)
    pub sample: PathBuf,

    #[command(flatten)]
    pub request: RequestArgs,

    /// JSON file of row edits keyed by sheet name
    #[arg(long)]
    pub edits: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the inferred column metadata of a sample
    Infer {
        sample: PathBuf,

        #[arg(long)]
        delimiter: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write the land, stage and configuration scripts
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory (default: output.dir from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the ZIP archive of scripts and template sheets
    Package {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        zip: Option<PathBuf>,
    },

    /// Commit the scripts on a feature branch and open a merge request
    Publish {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Run the HTTP service
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "dataonboard", version, about = "Generate onboarding scripts from a data sample")]
pub struct Cli {
    /// Config file (default: onboarding.toml when present)
    #[arg(long, global = true, env = "DATAONBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.cmd {
        Command::Infer {
            sample,
            delimiter,
            json,
        } => cmd_infer(&sample, delimiter.as_deref().unwrap_or_default(), json),
        Command::Generate { input, out } => {
            let use_case = OnboardingUseCase::new(Arc::new(config));
            cmd_generate(&use_case, input, out.as_deref())
        }
        Command::Package { input, zip } => {
            let use_case = OnboardingUseCase::new(Arc::new(config));
            cmd_package(&use_case, input, zip)
        }
        Command::Publish { input } => {
            let use_case = OnboardingUseCase::new(Arc::new(config));
            cmd_publish(&use_case, input).await
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start_server(Arc::new(config))?.await?;
            Ok(())
        }
    }
}

fn read_edits(path: Option<&Path>) -> Result<TemplateEdits> {
    let Some(path) = path else {
        return Ok(TemplateEdits::default());
    };
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::ParseError(format!("Invalid edits file {}: {}", path.display(), e)))
}

fn prepare(use_case: &OnboardingUseCase, input: InputArgs) -> Result<OnboardingContext> {
    let edits = read_edits(input.edits.as_deref())?;
    let request: OnboardingRequest = input.request.into();
    let sample = load_sample(&input.sample, parse_delimiter(&request.delmtr_cd))?;

    let mut ctx = use_case.prepare(request, &sample)?;
    use_case.generate(&mut ctx, &edits)?;
    Ok(ctx)
}

fn cmd_infer(sample: &Path, delimiter: &str, json: bool) -> Result<()> {
    let table = load_sample(sample, parse_delimiter(delimiter))?;
    let columns = infer_table(&table);

    if json {
        let out = serde_json::to_string_pretty(&columns)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{:<5} {:<32} {:<16} {:>8}  PK", "POS", "FIELD", "TYPE", "MAX_LEN");
    for column in &columns {
        let max_length = column
            .max_length
            .map(|len| len.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<5} {:<32} {:<16} {:>8}  {}",
            column.position,
            column.name,
            column.column_type.sql_name(),
            max_length,
            if column.primary_key { "Y" } else { "" }
        );
    }
    Ok(())
}

fn cmd_generate(use_case: &OnboardingUseCase, input: InputArgs, out: Option<&Path>) -> Result<()> {
    let mut ctx = prepare(use_case, input)?;
    for path in use_case.save(&mut ctx, out)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_package(use_case: &OnboardingUseCase, input: InputArgs, zip: Option<PathBuf>) -> Result<()> {
    let mut ctx = prepare(use_case, input)?;
    let (archive_name, bytes) = use_case.package(&mut ctx)?;

    let path = zip.unwrap_or_else(|| use_case.config().output.dir.join(&archive_name));
    storage::write_archive(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Archive written");
    println!("{}", path.display());
    Ok(())
}

async fn cmd_publish(use_case: &OnboardingUseCase, input: InputArgs) -> Result<()> {
    let mut ctx = prepare(use_case, input)?;
    let scripts = use_case.scripts(&mut ctx)?;

    let publish = &use_case.config().publish;
    let publisher = GitHubPublisher::from_config(publish)?;
    let report = PublishUseCase::new(Arc::new(publisher), &publish.target_branch)
        .execute(&ctx.request.naming(), &scripts)
        .await?;

    let out = serde_json::to_string_pretty(&report).map_err(|e| AppError::Internal(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_args_map_to_request() {
        let cli = parse(&[
            "dataonboard",
            "generate",
            "sample.csv",
            "--source",
            "fin_user",
            "--domain",
            "fin_user",
            "--dataset",
            "ds",
            "--table",
            "t",
            "--deprecation",
            "okrdra",
            "--classification",
            "intrnl",
            "--warehouse",
            "keu_it_small",
            "--dialect",
            "redshift",
            "--out",
            "build",
        ]);

        match cli.cmd {
            Command::Generate { input, out } => {
                assert_eq!(input.sample, PathBuf::from("sample.csv"));
                assert_eq!(out, Some(PathBuf::from("build")));
                let request: OnboardingRequest = input.request.into();
                assert_eq!(request.dialect, TargetDialect::Redshift);
                assert_eq!(request.fmt_type_cd, "csv");
                assert_eq!(request.delmtr_cd, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_edits_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edits.json");
        std::fs::write(
            &path,
            r#"{"sys_config_table_field_info": [{"row": 0, "column": "key_ind", "value": "Y"}]}"#,
        )
        .unwrap();

        let edits = read_edits(Some(&path)).unwrap();
        assert!(!edits.is_empty());

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            read_edits(Some(&path)),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_generate_writes_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("sample.csv");
        std::fs::write(&sample, "id,name\n1,alpha\n2,beta\n").unwrap();
        let out = dir.path().join("out");

        let cli = Cli::try_parse_from([
            "dataonboard",
            "generate",
            sample.to_str().unwrap(),
            "--source",
            "fin_user",
            "--domain",
            "fin_user",
            "--dataset",
            "ds",
            "--table",
            "t",
            "--deprecation",
            "okrdra",
            "--classification",
            "intrnl",
            "--warehouse",
            "keu_it_small",
        ])
        .unwrap();

        let Command::Generate { input, .. } = cli.cmd else {
            panic!("expected generate");
        };
        let use_case = OnboardingUseCase::new(Arc::new(AppConfig::default()));
        cmd_generate(&use_case, input, Some(&out)).unwrap();

        assert!(out.join("fin_user_ds_land.sql").exists());
        assert!(out.join("fin_user_ds_stage.sql").exists());
        assert!(out.join("fin_user_ds_rds.sql").exists());
    }
}
