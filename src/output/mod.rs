mod listing;
mod progress;
mod styling;
mod tables;

pub use listing::{render_job, render_jobs, render_lint, render_pipeline, render_pipelines};
pub use progress::Spinner;
pub use styling::bright_green;

use styling::{dim, magenta_bold};

/// Prints the `glci` banner to stderr.
pub fn print_banner() {
    eprintln!(
        "{} {}",
        magenta_bold("glci"),
        dim(env!("CARGO_PKG_VERSION")),
    );
}
