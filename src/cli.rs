// src/cli.rs
use crate::app::JobAgentApp;
use crate::auth::Session;
use crate::config::ClientConfig;
use crate::core::artifact_store::ArtifactKind;
use crate::core::pipeline::GenerationResult;
use crate::types::{CoverLetterDetails, ResumeFile};
use crate::utils::ensure_dir_exists;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "applyflow")]
#[command(about = "Analyse a resume, find matching jobs and generate tailored documents")]
pub struct AgentCli {
    #[command(subcommand)]
    pub command: AgentCommand,

    #[arg(long, env = "APPLYFLOW_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "APPLYFLOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bearer token from a previous sign in; skips --password
    #[arg(long, env = "APPLYFLOW_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long)]
    pub backend_url: Option<String>,

    /// Where generated PDFs are saved
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Listings shown without premium
    #[arg(long)]
    pub free_job_limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Upload a PDF resume and show its analysis
    Analyze { file: PathBuf },
    /// Find jobs matching the stored resume analysis
    Jobs {
        #[arg(long)]
        premium: bool,
    },
    /// Generate a resume tailored to a job description
    Resume {
        #[arg(long)]
        job_description: String,
    },
    /// Generate a cover letter
    CoverLetter {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        job_description: String,
        #[arg(long)]
        hiring_manager: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Generate resume and cover letter as a single document
    Combined {
        #[arg(long)]
        cover_letter_id: String,
        #[arg(long)]
        job_description: String,
    },
    /// List saved cover letters
    CoverLetters,
}

impl AgentCli {
    /// Command line flags take precedence over the loaded configuration
    pub fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.backend_url {
            config = config.with_backend_url(url.clone());
        }
        if let Some(dir) = &self.download_dir {
            config = config.with_download_dir(dir.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        if let Some(limit) = self.free_job_limit {
            config = config.with_free_job_limit(limit);
        }
        config
    }
}

async fn authenticate(app: &mut JobAgentApp, cli: &AgentCli) -> Result<()> {
    if let Some(token) = &cli.token {
        let email = cli.email.clone().unwrap_or_default();
        app.resume_session(Session::new(token.clone(), email)).await;
        return Ok(());
    }

    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            let session = app.sign_in(email, password).await?;
            println!("Signed in as {}", session.display_name());
            Ok(())
        }
        _ => bail!("Provide --email and --password, or set APPLYFLOW_TOKEN"),
    }
}

async fn save(app: &JobAgentApp, kind: ArtifactKind) -> Result<()> {
    let path = app.pipeline().download_artifact(kind).await?;
    println!("Saved {} to {}", kind, path.display());
    Ok(())
}

pub async fn handle_agent_command(cli: AgentCli, config: ClientConfig) -> Result<()> {
    let config = cli.apply_overrides(config);
    ensure_dir_exists(&config.download_dir).await?;
    info!("Using backend {}", config.backend_url);

    let mut app = JobAgentApp::connect(config)?;
    authenticate(&mut app, &cli).await?;

    let result = run(&mut app, cli.command).await;
    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    app.sign_out();
    result
}

async fn run(app: &mut JobAgentApp, command: AgentCommand) -> Result<()> {
    match command {
        AgentCommand::Analyze { file } => {
            let file = ResumeFile::from_path(&file).await?;
            let workflow = app.workflow_mut();
            workflow.select_file(file)?;
            let summary = workflow.handle_upload_submit().await?;

            println!("Skills:     {}", summary.skills.join(", "));
            println!("Experience: {}", summary.experience);
            println!("Education:  {}", summary.education);
        }

        AgentCommand::Jobs { premium } => {
            let workflow = app.workflow_mut();
            if workflow.continue_with_existing_analysis()?.is_none() {
                bail!("No resume analysis found. Run `applyflow analyze <file>` first");
            }
            workflow.handle_find_jobs().await?;

            let policy = workflow.visibility_policy(premium);
            let visible = workflow.visible_jobs(&policy);
            for (i, job) in visible.shown.iter().enumerate() {
                println!("{}. {} at {} ({})", i + 1, job.title, job.company, job.location);
                if !job.url.is_empty() {
                    println!("   {}", job.url);
                }
            }
            if let Some(message) = visible.upsell_message() {
                println!("{}", message);
            }
        }

        AgentCommand::Resume { job_description } => {
            app.pipeline().generate_resume(&job_description).await?;
            save(app, ArtifactKind::Resume).await?;
        }

        AgentCommand::CoverLetter {
            company,
            position,
            job_description,
            hiring_manager,
            notes,
        } => {
            let mut details = CoverLetterDetails::new(company, position, job_description);
            if let Some(name) = hiring_manager {
                details = details.with_hiring_manager(name);
            }
            if let Some(notes) = notes {
                details = details.with_notes(notes);
            }

            let cover_letter_id = match app.pipeline().generate_cover_letter(&details).await? {
                GenerationResult::Ready(artifact) => artifact.source_id,
                GenerationResult::Pending(draft) => {
                    app.pipeline().download_cover_letter(&draft.id).await?;
                    Some(draft.id)
                }
            };
            save(app, ArtifactKind::CoverLetter).await?;
            if let Some(id) = cover_letter_id {
                println!("Cover letter id: {}", id);
            }
        }

        AgentCommand::Combined {
            cover_letter_id,
            job_description,
        } => {
            app.pipeline()
                .generate_combined(&cover_letter_id, &job_description)
                .await?;
            save(app, ArtifactKind::Combined).await?;
        }

        AgentCommand::CoverLetters => {
            let letters = app.pipeline().list_cover_letters().await?;
            if letters.is_empty() {
                println!("No saved cover letters");
            }
            for letter in letters {
                let created = letter.created_at.as_deref().unwrap_or("-");
                let preview: String = letter.content.chars().take(60).collect();
                println!("{}  {}  {}", letter.id, created, preview);
            }
        }
    }
    Ok(())
}
