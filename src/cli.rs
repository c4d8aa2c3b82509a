use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{user_config_path, Config, OutputFormat};
use crate::git::GitRepo;
use crate::output;
use crate::providers::gitlab::{
    job_url, pipeline_url, CreatePipelineOptions, GitLabProvider, ListPipelinesOptions,
    PipelineFilter, PipelineVariable, SortOrder, Status, VariableType,
};

#[derive(Parser)]
#[command(name = "glci")]
#[command(author, version, about = "GitLab CI/CD pipeline and job tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./glci.toml or the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab instance base URL
    #[arg(short, long, global = true, env = "GITLAB_URL")]
    url: Option<String>,

    /// Project path ("group/project") or numeric id
    #[arg(short = 'P', long, global = true)]
    project: Option<String>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pipelines
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommand,
    },
    /// Manage jobs
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum PipelineCommand {
    /// List pipelines, newest first
    List {
        #[arg(short, long = "ref")]
        ref_: Option<String>,
        #[arg(long)]
        sha: Option<String>,
        #[arg(short, long)]
        status: Option<Status>,
        /// Order by pipeline id
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(short = 'n', long, default_value_t = 30)]
        per_page: u32,
    },
    /// Show a single pipeline
    Get {
        id: u64,
        /// Also list the pipeline's jobs
        #[arg(short, long)]
        jobs: bool,
    },
    /// Show the newest pipeline on a branch and its jobs
    Status {
        /// Branch name (defaults to the current branch)
        #[arg(short, long = "ref")]
        ref_: Option<String>,
    },
    /// Trigger a new pipeline
    Create {
        /// Branch or tag (defaults to the current branch)
        #[arg(short, long = "ref")]
        ref_: Option<String>,
        /// Environment variable, KEY=VALUE
        #[arg(short = 'V', long = "variable")]
        variables: Vec<String>,
        /// File variable, KEY=CONTENT
        #[arg(long = "variable-file")]
        file_variables: Vec<String>,
    },
    /// Retry the failed and canceled jobs of a pipeline
    Retry { id: u64 },
    /// Delete a pipeline and its jobs
    Delete { id: u64 },
    /// Validate a CI configuration file
    Lint {
        #[arg(default_value = ".gitlab-ci.yml")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum JobCommand {
    /// List jobs of a pipeline, or the project's recent jobs
    List {
        #[arg(long)]
        pipeline: Option<u64>,
        /// Restrict to statuses (project jobs only)
        #[arg(short, long)]
        scope: Vec<Status>,
        #[arg(short = 'n', long, default_value_t = 30)]
        per_page: u32,
    },
    /// Show a single job
    Get { id: u64 },
    /// Play a manual job or retry a finished one
    Run { id: u64 },
    /// Start a manual job
    Play { id: u64 },
    /// Run a new attempt of a job
    Retry { id: u64 },
    Cancel { id: u64 },
    /// Remove a job's log and artifacts
    Erase { id: u64 },
    /// Print a job's log
    ///
    /// Without an id, the job is looked up by name in the newest pipeline
    /// for a commit; the running job or the newest one stands in when no
    /// job has that name.
    Trace {
        id: Option<u64>,
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(long, conflicts_with = "ref_")]
        sha: Option<String>,
        /// Branch whose head commit to use (defaults to the current branch)
        #[arg(short, long = "ref")]
        ref_: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to a file
    Init {
        /// Target file (defaults to the user config dir)
        path: Option<PathBuf>,
    },
}

/// Config file values with command-line overrides applied.
struct Settings {
    config: Config,
    format: OutputFormat,
    pretty: bool,
}

impl Settings {
    fn provider(&self) -> Result<GitLabProvider> {
        let Some(project) = self.config.gitlab.project.clone() else {
            bail!("No project given; pass --project or set gitlab.project in the config file");
        };
        let token = self.config.gitlab.token.as_deref().map(Token::from);
        Ok(GitLabProvider::new(&self.config.gitlab.base_url, project, token)?)
    }

    fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json if self.pretty => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
            OutputFormat::Table => println!("{}", table()),
        }
        Ok(())
    }
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(token) = &self.token {
            config.gitlab.token = Some(token.clone());
        }
        if let Some(url) = &self.url {
            config.gitlab.base_url = url.clone();
        }
        if let Some(project) = &self.project {
            config.gitlab.project = Some(project.clone());
        }

        let format = self.format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;

        Ok(Settings {
            config,
            format,
            pretty,
        })
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = self.settings()?;

        match &self.command {
            Commands::Pipeline { command } => execute_pipeline(&settings, command).await,
            Commands::Job { command } => execute_job(&settings, command).await,
            Commands::Config { command } => execute_config(&settings, command),
        }
    }
}

fn resolve_ref(ref_: Option<&str>) -> Result<String> {
    match PipelineFilter::for_ref(ref_, &GitRepo)? {
        PipelineFilter::Ref(ref_) | PipelineFilter::Sha(ref_) => Ok(ref_),
    }
}

fn parse_variables(raw: &[String], variable_type: VariableType) -> Result<Vec<PipelineVariable>> {
    raw.iter()
        .map(|raw| {
            PipelineVariable::parse(raw, variable_type)
                .with_context(|| format!("Invalid variable '{raw}', expected KEY=VALUE"))
        })
        .collect()
}

async fn execute_pipeline(settings: &Settings, command: &PipelineCommand) -> Result<()> {
    let provider = settings.provider()?;
    let client = &provider.client;
    let project = provider.project_path.as_str();
    let base_url = settings.config.gitlab.base_url.as_str();

    match command {
        PipelineCommand::List {
            ref_,
            sha,
            status,
            sort,
            page,
            per_page,
        } => {
            let opts = ListPipelinesOptions {
                ref_: ref_.clone(),
                sha: sha.clone(),
                status: status.clone(),
                sort: Some(*sort),
                page: Some(*page),
                per_page: Some(*per_page),
            };
            let pipelines = client.list_pipelines(project, &opts).await?.items;
            settings.emit(&pipelines, || output::render_pipelines(&pipelines))
        }
        PipelineCommand::Get { id, jobs } => {
            let pipeline = client.get_pipeline(project, *id).await?;
            let jobs = if *jobs {
                let spinner = output::Spinner::start("Fetching jobs");
                let jobs = provider.pipeline_jobs(*id).await?;
                spinner.clear();
                jobs
            } else {
                Vec::new()
            };
            let url = pipeline_url(base_url, project, pipeline.id);
            settings.emit(&(&pipeline, &jobs), || {
                output::render_pipeline(&pipeline, &jobs, &url)
            })
        }
        PipelineCommand::Status { ref_ } => {
            let filter = PipelineFilter::for_ref(ref_.as_deref(), &GitRepo)?;
            let spinner = output::Spinner::start(&format!("Fetching newest pipeline on {filter}"));
            let (info, jobs) = provider.jobs_for_ref(&filter).await?;
            let pipeline = client.get_pipeline(project, info.id).await?;
            spinner.finish(&format!("Fetched {} jobs", jobs.len()));

            let url = pipeline_url(base_url, project, pipeline.id);
            settings.emit(&(&pipeline, &jobs), || {
                output::render_pipeline(&pipeline, &jobs, &url)
            })
        }
        PipelineCommand::Create {
            ref_,
            variables,
            file_variables,
        } => {
            let mut all = parse_variables(variables, VariableType::EnvVar)?;
            all.extend(parse_variables(file_variables, VariableType::File)?);
            let opts = CreatePipelineOptions {
                ref_: resolve_ref(ref_.as_deref())?,
                variables: all,
            };
            info!("Creating pipeline on {}", opts.ref_);

            let pipeline = client.create_pipeline(project, &opts).await?;
            let url = pipeline_url(base_url, project, pipeline.id);
            settings.emit(&pipeline, || output::render_pipeline(&pipeline, &[], &url))
        }
        PipelineCommand::Retry { id } => {
            let pipeline = client.retry_pipeline(project, *id).await?;
            let url = pipeline_url(base_url, project, pipeline.id);
            settings.emit(&pipeline, || output::render_pipeline(&pipeline, &[], &url))
        }
        PipelineCommand::Delete { id } => {
            client.delete_pipeline(project, *id).await?;
            eprintln!("{}", output::bright_green(format!("Deleted pipeline {id}")));
            Ok(())
        }
        PipelineCommand::Lint { file } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let result = client.lint(project, &content).await?;
            settings.emit(&result, || output::render_lint(&result))?;
            if !result.valid {
                bail!("{} is invalid", file.display());
            }
            Ok(())
        }
    }
}

async fn execute_job(settings: &Settings, command: &JobCommand) -> Result<()> {
    let provider = settings.provider()?;
    let client = &provider.client;
    let project = provider.project_path.as_str();
    let base_url = settings.config.gitlab.base_url.as_str();

    let show = |job: &crate::providers::gitlab::Job| -> Result<()> {
        let url = job_url(base_url, project, job.id);
        settings.emit(job, || output::render_job(job, &url))
    };

    match command {
        JobCommand::List {
            pipeline,
            scope,
            per_page,
        } => {
            let jobs = if let Some(pipeline) = pipeline {
                let spinner = output::Spinner::start("Fetching jobs");
                let jobs = provider.pipeline_jobs(*pipeline).await?;
                spinner.clear();
                jobs
            } else {
                client.list_project_jobs(project, scope, *per_page).await?
            };
            settings.emit(&jobs, || output::render_jobs(&jobs))
        }
        JobCommand::Get { id } => show(&client.get_job(project, *id).await?),
        JobCommand::Run { id } => {
            let job = client.get_job(project, *id).await?;
            match provider.play_or_retry_job(job.id, &job.status).await? {
                Some(job) => show(&job),
                None => {
                    eprintln!("Job {id} is already {}", job.status);
                    Ok(())
                }
            }
        }
        JobCommand::Play { id } => show(&client.play_job(project, *id).await?),
        JobCommand::Retry { id } => show(&client.retry_job(project, *id).await?),
        JobCommand::Cancel { id } => show(&client.cancel_job(project, *id).await?),
        JobCommand::Erase { id } => show(&client.erase_job(project, *id).await?),
        JobCommand::Trace {
            id,
            name,
            sha,
            ref_,
        } => {
            let (job, log) = if let Some(id) = id {
                let job = client.get_job(project, *id).await?;
                let log = client.job_trace(project, *id).await?;
                (job, log)
            } else {
                let sha = match sha {
                    Some(sha) => sha.clone(),
                    None => provider.resolve_sha(&resolve_ref(ref_.as_deref())?).await?,
                };
                let Some(found) = provider.job_trace_with_sha(&sha, name).await? else {
                    eprintln!("No jobs found for commit {sha}");
                    return Ok(());
                };
                found
            };

            let url = job_url(base_url, project, job.id);
            eprintln!("{}", output::render_job(&job, &url));
            let mut stdout = std::io::stdout().lock();
            log.copy_to(&mut stdout).await?;
            Ok(())
        }
    }
}

fn execute_config(settings: &Settings, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut shown = settings.config.clone();
            if shown.gitlab.token.is_some() {
                shown.gitlab.token = Some("***".to_string());
            }
            println!("{}", toml::to_string_pretty(&shown)?);
            Ok(())
        }
        ConfigCommand::Init { path } => {
            let path = match path {
                Some(path) => path.clone(),
                None => user_config_path().context("No user config directory on this platform")?,
            };
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            settings.config.save(&path)?;
            info!("Config written to: {}", path.display());
            eprintln!("{}", output::bright_green(format!("Wrote {}", path.display())));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_trace_by_name_and_sha() {
        let cli = Cli::try_parse_from([
            "glci", "-P", "group/project", "job", "trace", "--sha", "abc123", "-n", "build",
        ])
        .unwrap();

        match cli.command {
            Commands::Job {
                command: JobCommand::Trace { id, name, sha, .. },
            } => {
                assert_eq!(id, None);
                assert_eq!(name, "build");
                assert_eq!(sha.as_deref(), Some("abc123"));
            }
            _ => panic!("expected job trace"),
        }
    }

    #[test]
    fn rejects_unknown_status_filter() {
        let result = Cli::try_parse_from(["glci", "pipeline", "list", "--status", "bogus"]);
        assert!(result.is_err());
    }

    #[test]
    fn pipeline_list_sort_defaults_to_newest_first() {
        let sort_of = |args: &[&str]| match Cli::try_parse_from(args).unwrap().command {
            Commands::Pipeline {
                command: PipelineCommand::List { sort, .. },
            } => sort,
            _ => panic!("expected pipeline list"),
        };

        assert_eq!(sort_of(&["glci", "pipeline", "list"]), SortOrder::Desc);
        assert_eq!(
            sort_of(&["glci", "pipeline", "list", "--sort", "asc"]),
            SortOrder::Asc
        );
    }

    #[test]
    fn flags_override_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("glci.toml");
        std::fs::write(
            &path,
            "[gitlab]\nbase-url = \"https://file.example.com\"\nproject = \"from/file\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "glci",
            "--config",
            path.to_str().unwrap(),
            "-P",
            "from/flag",
            "-f",
            "json",
            "config",
            "show",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();

        assert_eq!(settings.config.gitlab.project.as_deref(), Some("from/flag"));
        assert_eq!(settings.config.gitlab.base_url, "https://file.example.com");
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn invalid_variable_is_rejected() {
        let result = parse_variables(&["NOVALUE".to_string()], VariableType::EnvVar);
        assert!(result.is_err());
    }
}
