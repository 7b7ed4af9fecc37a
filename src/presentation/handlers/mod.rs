mod error;
mod health;
pub mod transcription_types;
mod transcriptions;
mod uploads;

pub use error::ApiError;
pub use health::health_handler;
pub use transcriptions::{
    check_handler, job_status_handler, submit_handler, transcribe_handler,
};
pub use uploads::upload_url_handler;
