use std::fmt::Write;

use comfy_table::Cell;

use crate::providers::gitlab::{Job, LintResult, Pipeline, PipelineInfo};

use super::styling::{bright, bright_green, bright_red, dim};
use super::tables::{create_table, duration_cell, header, status_cell};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

pub fn render_pipelines(pipelines: &[PipelineInfo]) -> String {
    if pipelines.is_empty() {
        return dim("No pipelines found").to_string();
    }

    let mut table = create_table();
    table.set_header(header(&["ID", "Status", "Ref", "SHA", "Source", "Created"]));
    for pipeline in pipelines {
        table.add_row(vec![
            Cell::new(pipeline.id),
            status_cell(&pipeline.status),
            Cell::new(&pipeline.ref_),
            Cell::new(short_sha(&pipeline.sha)),
            Cell::new(pipeline.source.as_deref().unwrap_or("-")),
            Cell::new(pipeline.created_at.format(TIME_FORMAT)),
        ]);
    }
    table.to_string()
}

/// Pipeline header followed by its jobs, if any were fetched.
pub fn render_pipeline(pipeline: &Pipeline, jobs: &[Job], web_url: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} {} ({})",
        bright(format!("Pipeline #{}", pipeline.id)),
        status_cell(&pipeline.status).content(),
        dim(&pipeline.ref_)
    );
    let _ = writeln!(output, "  SHA:     {}", pipeline.sha);
    if let Some(user) = &pipeline.user {
        let _ = writeln!(output, "  User:    {}", user.username);
    }
    let _ = writeln!(
        output,
        "  Created: {}",
        pipeline.created_at.format(TIME_FORMAT)
    );
    if let Some(duration) = pipeline.duration {
        let _ = writeln!(output, "  Took:    {duration}s");
    }
    let _ = writeln!(
        output,
        "  URL:     {}",
        pipeline.web_url.as_deref().unwrap_or(web_url)
    );

    if !jobs.is_empty() {
        let _ = writeln!(output);
        output.push_str(&render_jobs(jobs));
    }
    output
}

pub fn render_jobs(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return dim("No jobs found").to_string();
    }

    let mut table = create_table();
    table.set_header(header(&[
        "ID", "Name", "Stage", "Status", "Duration", "Pipeline", "Created",
    ]));
    for job in jobs {
        table.add_row(vec![
            Cell::new(job.id),
            Cell::new(&job.name),
            Cell::new(&job.stage),
            status_cell(&job.status),
            duration_cell(job.duration),
            Cell::new(job.pipeline.id),
            Cell::new(job.created_at.format(TIME_FORMAT)),
        ]);
    }
    table.to_string()
}

/// One-line summary, e.g. `job 42 build (failed) https://...`
pub fn render_job(job: &Job, web_url: &str) -> String {
    format!(
        "{} {} ({}) {}",
        bright(format!("job {}", job.id)),
        job.name,
        job.status,
        dim(job.web_url.as_deref().unwrap_or(web_url))
    )
}

pub fn render_lint(result: &LintResult) -> String {
    let mut output = String::new();
    if result.valid {
        let _ = writeln!(output, "{}", bright_green("CI configuration is valid"));
    } else {
        let _ = writeln!(output, "{}", bright_red("CI configuration is invalid"));
    }
    for error in &result.errors {
        let _ = writeln!(output, "  {} {error}", bright_red("error:"));
    }
    for warning in &result.warnings {
        let _ = writeln!(output, "  {} {warning}", dim("warning:"));
    }
    output
}
