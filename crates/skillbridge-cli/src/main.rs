//! skillbridge CLI: learn, get assessed and find mentors from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "skillbridge",
    version,
    about = "SkillBridge learning client: lessons, assessments and mentorship"
)]
struct Cli {
    /// Config file path (default: ./skillbridge.toml, then ~/.config/skillbridge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Work offline against a TOML lesson catalog (file or directory).
    /// Progress lasts one run unless --profile is given
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Keep the offline learner profile in this JSON file between --catalog runs
    #[arg(long, global = true, value_name = "FILE")]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and example catalog
    Init,

    /// Validate lesson catalog TOML files
    Validate {
        /// Catalog file or directory
        path: PathBuf,
    },

    /// List topics, recommended ones first
    Topics {
        /// Filter by name or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a topic's lessons with their lock state
    Lessons {
        topic: String,
    },

    /// Progress in every started topic
    Courses,

    /// Open a lesson
    Lesson {
        topic: String,
        lesson: String,
    },

    /// Submit a lesson's assessment
    Submit {
        topic: String,
        lesson: String,

        /// Answer as QUESTION=OPTION (repeatable)
        #[arg(long = "answer", value_name = "QUESTION=OPTION")]
        answers: Vec<String>,
    },

    /// Grade a micro-quiz from a JSON file ({"quiz": ..., "answers": [...]})
    Grade {
        file: PathBuf,
    },

    /// Show the learner profile
    Profile,

    /// Replace the learner's interests
    Interests {
        #[arg(required = true)]
        interests: Vec<String>,
    },

    /// List mentor resources for a topic
    Resources {
        topic: String,
    },

    /// Upload a resource link (mentors only)
    Upload {
        topic: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        url: String,

        /// video, pdf or article
        #[arg(long, default_value = "video")]
        kind: String,
    },

    /// Topic discussion boards
    Community {
        #[command(subcommand)]
        command: CommunityCommand,
    },

    /// List mentors for a topic
    Mentors {
        topic: String,
    },

    /// Mentor applications and requests
    Mentorship {
        #[command(subcommand)]
        command: MentorshipCommand,
    },

    /// Mentorship chat
    Chat {
        #[command(subcommand)]
        command: ChatCommand,
    },
}

#[derive(Subcommand)]
pub(crate) enum CommunityCommand {
    /// List a topic's posts, newest first
    List { topic: String },

    /// Start a discussion
    Post {
        topic: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,
    },

    /// Show a post with its replies
    Show { post: String },

    /// Reply to a post
    Reply { post: String, text: String },
}

#[derive(Subcommand)]
pub(crate) enum MentorshipCommand {
    /// Apply as a mentor, as a topic graduate or with a free-form bio
    Apply {
        /// Topic whose hard lessons you have finished
        #[arg(long, conflicts_with = "topics")]
        topic: Option<String>,

        /// Comma-separated topic ids (manual application)
        #[arg(long)]
        topics: Option<String>,

        #[arg(long, default_value = "")]
        bio: String,
    },

    /// Ask a mentor for help
    Request {
        mentor: String,

        #[arg(long)]
        topic: String,

        #[arg(long)]
        message: String,
    },

    /// Requests addressed to you as a mentor
    Dashboard,

    /// Accept or reject a request
    Respond {
        request: String,

        /// accept or reject
        decision: String,
    },

    /// Requests you have sent
    Sent,
}

#[derive(Subcommand)]
pub(crate) enum ChatCommand {
    /// Print a request's messages
    Show {
        request: String,

        /// Keep polling for new messages
        #[arg(long)]
        watch: bool,
    },

    /// Send a message
    Send { request: String, text: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillbridge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        config_path: cli.config,
        catalog: cli.catalog,
        profile: cli.profile,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::Topics { search } => commands::learn::topics(&ctx, search).await,
        Commands::Lessons { topic } => commands::learn::lessons(&ctx, &topic).await,
        Commands::Courses => commands::learn::courses(&ctx).await,
        Commands::Lesson { topic, lesson } => commands::learn::lesson(&ctx, &topic, &lesson).await,
        Commands::Submit {
            topic,
            lesson,
            answers,
        } => commands::learn::submit(&ctx, &topic, &lesson, &answers).await,
        Commands::Grade { file } => commands::grade::execute(&ctx, file).await,
        Commands::Profile => commands::profile::show(&ctx).await,
        Commands::Interests { interests } => commands::profile::interests(&ctx, interests).await,
        Commands::Resources { topic } => commands::resources::list(&ctx, &topic).await,
        Commands::Upload {
            topic,
            title,
            url,
            kind,
        } => commands::resources::upload(&ctx, &topic, &title, &url, &kind).await,
        Commands::Community { command } => commands::community::execute(&ctx, command).await,
        Commands::Mentors { topic } => commands::mentorship::mentors(&ctx, &topic).await,
        Commands::Mentorship { command } => commands::mentorship::execute(&ctx, command).await,
        Commands::Chat { command } => commands::chat::execute(&ctx, command).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
