use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::application::use_cases::packaging::build_archive;
use crate::application::use_cases::script_generator::generate_scripts;
use crate::application::use_cases::template_builder::{apply_edits, TemplateBuilder};
use crate::domain::column::SampleTable;
use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::OnboardingRequest;
use crate::domain::template::{GeneratedScripts, OnboardingContext, TemplateEdits};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage;

/// Drives a request from sample upload to generated artifacts
pub struct OnboardingUseCase {
    config: Arc<AppConfig>,
    builder: TemplateBuilder,
}

impl OnboardingUseCase {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let builder = TemplateBuilder::new(config.defaults.clone());
        Self { config, builder }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate the request and derive the template sheets from the sample
    pub fn prepare(
        &self,
        request: OnboardingRequest,
        sample: &SampleTable,
    ) -> Result<OnboardingContext> {
        request.validate()?;
        self.config.catalog.check(&request)?;

        let sheets = self.builder.build(&request, sample);
        info!(
            source = %request.src_nm,
            dataset = %request.dataset_nm,
            table = %request.table_nm,
            fields = sheets.field_info.len(),
            "Template prepared"
        );
        Ok(OnboardingContext::new(request, sheets))
    }

    /// Apply pending edits, then regenerate all three scripts
    pub fn generate<'a>(
        &self,
        ctx: &'a mut OnboardingContext,
        edits: &TemplateEdits,
    ) -> Result<&'a GeneratedScripts> {
        if !edits.is_empty() {
            apply_edits(&mut ctx.sheets, edits)?;
        }

        let scripts = generate_scripts(
            &ctx.sheets,
            &ctx.request.naming(),
            &self.config.rds.schema,
        )?;
        info!(prefix = %ctx.request.naming().prefix(), "Scripts generated");
        Ok(ctx.scripts.insert(scripts))
    }

    /// Scripts already on the context, generated on demand otherwise
    pub fn scripts(&self, ctx: &mut OnboardingContext) -> Result<GeneratedScripts> {
        if ctx.scripts.is_none() {
            self.generate(ctx, &TemplateEdits::default())?;
        }
        ctx.scripts
            .clone()
            .ok_or_else(|| AppError::Internal("Scripts missing after generation".to_string()))
    }

    /// Archive file name and bytes
    pub fn package(&self, ctx: &mut OnboardingContext) -> Result<(String, Vec<u8>)> {
        let scripts = self.scripts(ctx)?;
        let naming = ctx.request.naming();
        let bytes = build_archive(
            &naming,
            &scripts,
            Some(&ctx.sheets),
            &self.config.rds.schema,
        )?;
        Ok((naming.archive_name(), bytes))
    }

    /// Write the scripts to `dir`, or the configured output directory
    pub fn save(&self, ctx: &mut OnboardingContext, dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let scripts = self.scripts(ctx)?;
        let dir = dir.unwrap_or(self.config.output.dir.as_path());
        let written = storage::save_scripts(dir, &ctx.request.naming(), &scripts)?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::onboarding::sample_request;
    use crate::domain::template::{RowEdit, SheetKind};
    use serde_json::json;

    fn use_case() -> OnboardingUseCase {
        OnboardingUseCase::new(Arc::new(AppConfig::default()))
    }

    fn request() -> OnboardingRequest {
        let mut request = sample_request();
        request.src_nm = "fin_user".to_string();
        request
    }

    fn sample() -> SampleTable {
        SampleTable::from_rows(
            vec!["id".to_string(), "nm".to_string()],
            vec![
                vec![Some("1".to_string()), Some("alpha".to_string())],
                vec![Some("2".to_string()), Some("beta".to_string())],
            ],
        )
    }

    #[test]
    fn test_prepare_rejects_invalid_identifiers() {
        let mut request = request();
        request.table_nm = "bad name".to_string();

        let result = use_case().prepare(request, &sample());
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_generate_produces_all_scripts() {
        let use_case = use_case();
        let mut ctx = use_case.prepare(request(), &sample()).unwrap();

        let scripts = use_case.generate(&mut ctx, &TemplateEdits::default()).unwrap();
        assert!(scripts
            .land
            .starts_with("CREATE TABLE land.fin_user_ds_t (\nid NUMBER(38,0) PRIMARY KEY,"));
        assert!(scripts.stage.starts_with("CREATE TABLE stage.fin_user_ds_t"));
        assert!(scripts
            .rds
            .contains("INSERT INTO app_mgmt.sys_config_table_field_info"));
        assert!(ctx.scripts.is_some());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let use_case = use_case();
        let mut first = use_case.prepare(request(), &sample()).unwrap();
        let mut second = use_case.prepare(request(), &sample()).unwrap();

        let a = use_case.scripts(&mut first).unwrap();
        let b = use_case.scripts(&mut second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_edits_flow_into_ddl() {
        let use_case = use_case();
        let mut ctx = use_case.prepare(request(), &sample()).unwrap();

        let mut edits = TemplateEdits::default();
        edits.push(
            SheetKind::TableFieldInfo,
            RowEdit {
                row: 1,
                column: "datatype_nm".to_string(),
                value: json!("VARCHAR(64)"),
            },
        );
        let scripts = use_case.generate(&mut ctx, &edits).unwrap();
        assert!(scripts.land.contains("nm VARCHAR(64)"));
    }

    #[test]
    fn test_empty_sample_fails_generation() {
        let use_case = use_case();
        let mut ctx = use_case.prepare(request(), &SampleTable::default()).unwrap();

        let err = use_case.package(&mut ctx).unwrap_err();
        assert!(matches!(err, AppError::EmptyMetadata));
        assert!(ctx.scripts.is_none());
    }

    #[test]
    fn test_package_and_save() {
        let use_case = use_case();
        let mut ctx = use_case.prepare(request(), &sample()).unwrap();

        let (name, bytes) = use_case.package(&mut ctx).unwrap();
        assert_eq!(name, "fin_user_ds_Onboarding_Files.zip");
        assert!(!bytes.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let written = use_case.save(&mut ctx, Some(dir.path())).unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join("fin_user_ds_land.sql").exists());
    }
}
