pub mod submission;

pub use submission::{validate_submission, IntakeError, PreferenceSubmission, PreferenceSubmissionRequest};
