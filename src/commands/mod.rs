// Request construction, batch dispatch, and the top-level run flow.
pub mod dispatch;
pub mod request;
pub mod run;

pub use run::run_cli;
