pub mod registration;

pub use registration::RegistrationService;
