pub mod use_cases;

pub use use_cases::onboarding::OnboardingUseCase;
pub use use_cases::publish::PublishUseCase;
