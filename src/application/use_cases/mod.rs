pub mod onboarding;
pub mod packaging;
pub mod publish;
pub mod script_generator;
pub mod template_builder;
pub mod type_inference;
