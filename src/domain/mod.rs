pub mod column;
pub mod config_records;
pub mod error;
pub mod onboarding;
pub mod publish;
pub mod template;
