use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{clear, config, focus, playlist, quiz, summarize, timer, video};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "studybuddy")]
#[command(about = "StudyBuddy - Learn from YouTube playlists without losing focus")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use the local in-memory store instead of Appwrite
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage study playlists
    #[command(long_about = "Create, list, rename and delete study playlists. Deleting a playlist also deletes its videos; if that fails halfway the removed videos are restored.")]
    Playlist {
        #[command(subcommand)]
        cmd: PlaylistCommands,
    },
    /// Manage the videos of a playlist
    #[command(long_about = "Add YouTube videos to a playlist, record watch progress and remove videos. Videos can be given as a watch URL, a youtu.be link or a bare video id.")]
    Video {
        #[command(subcommand)]
        cmd: VideoCommands,
    },
    /// Summarize a YouTube video up to a timestamp
    #[command(long_about = "Ask the companion backend for a summary of a YouTube video covering everything up to the given position. The quiz returned with the summary can be taken with 'studybuddy quiz'.")]
    Summarize {
        /// YouTube watch URL or video id
        url: String,

        /// Position in the video, in seconds
        #[arg(long, default_value_t = 0.0)]
        at: f64,
    },
    /// Summarize a web page
    #[command(long_about = "Ask the companion backend for a summary of a web page. The last summaries are kept in a local history; use --history to show it instead of summarizing.")]
    WebSummarize {
        /// Page URL
        #[arg(required_unless_present = "history")]
        url: Option<String>,

        /// Show recent summaries
        #[arg(long, action = ArgAction::SetTrue)]
        history: bool,
    },
    /// Watch the distraction detector
    #[command(long_about = "Subscribe to a companion score feed and print each sample with its focus status and the rolling average over the last 30 samples.")]
    Focus {
        /// Feed to subscribe to
        #[arg(long, value_enum, default_value = "distracted")]
        feed: FeedArg,

        /// Stop after this many samples
        #[arg(long)]
        samples: Option<usize>,
    },
    /// Run the focus/break timer
    #[command(long_about = "Run a focus timer in the terminal: focus sessions alternate with short breaks, with a long break after every fourth session.")]
    Timer {
        /// Number of focus sessions to run
        #[arg(long, default_value_t = 4)]
        sessions: u32,

        /// Focus session length in minutes
        #[arg(long, default_value_t = 25)]
        focus_minutes: u64,

        /// Short break length in minutes
        #[arg(long, default_value_t = 5)]
        break_minutes: u64,

        /// Long break length in minutes
        #[arg(long, default_value_t = 15)]
        long_break_minutes: u64,
    },
    /// Take the quiz generated for a video
    #[command(long_about = "Fetch a summary and quiz for a YouTube video and answer the questions interactively.")]
    Quiz {
        /// YouTube watch URL or video id
        url: String,

        /// Position in the video, in seconds
        #[arg(long, default_value_t = 0.0)]
        at: f64,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for StudyBuddy. Use subcommands to view the configuration or set up the Appwrite document store and the companion backend.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored credentials or local data
    #[command(long_about = "Clear stored credentials, the offline store and the summary history. Use --credentials to clear stored credentials or --all to clear everything.")]
    Clear {
        /// Clear credentials and all local data
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "credentials")]
        all: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum PlaylistCommands {
    /// List your playlists, most recently updated first
    List,
    /// Show a playlist with its videos
    Show {
        /// Playlist id
        id: String,
    },
    /// Create a playlist
    Create {
        /// Playlist name
        name: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// Rename a playlist or change its description
    Rename {
        /// Playlist id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a playlist and all of its videos
    Delete {
        /// Playlist id
        id: String,

        /// Do not ask for confirmation
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Recount a playlist's videos and fix its stored count
    Reconcile {
        /// Playlist id
        id: String,
    },
    /// Every playlist with its videos and progress
    Dashboard,
}

#[derive(Subcommand)]
enum VideoCommands {
    /// Add a YouTube video to a playlist
    Add {
        /// Playlist id
        playlist: String,

        /// YouTube URL or video id
        video: String,

        /// Title shown in the playlist
        #[arg(long)]
        title: String,
    },
    /// Set the watch progress of a video (0-100)
    Progress {
        /// Video document id
        video: String,

        /// Percent watched
        percent: String,
    },
    /// Remove a video from its playlist
    Remove {
        /// Video document id
        video: String,

        /// Playlist the video belongs to
        #[arg(long)]
        playlist: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. Sensitive data like API keys and session tokens are masked. Use --full to show them.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the Appwrite document store
    #[command(long_about = "Configure the Appwrite endpoint, project, database and collections, and store an API key or a session JWT in the credentials file.")]
    Appwrite {
        /// Appwrite endpoint (if not provided, will prompt)
        #[arg(long)]
        endpoint: Option<String>,

        /// Project id (if not provided, will prompt)
        #[arg(long)]
        project_id: Option<String>,

        /// Database id (if not provided, will prompt)
        #[arg(long)]
        database_id: Option<String>,

        /// Authenticate with a session JWT instead of an API key
        #[arg(long, action = ArgAction::SetTrue)]
        jwt: bool,
    },

    /// Configure the companion backend
    #[command(long_about = "Configure the base URL of the companion backend that serves summaries, quizzes and the distraction feeds.")]
    Companion {
        /// Base URL (if not provided, will prompt)
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FeedArg {
    Distracted,
    Score,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_settings = logging::configured_logging();
    logging::init_logging(cli.verbose, cli.quiet, &log_settings)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Playlist { cmd } => playlist::run_playlist(cmd, cli.offline, &output).await,
        Commands::Video { cmd } => video::run_video(cmd, cli.offline, &output).await,
        Commands::Summarize { url, at } => summarize::run_summarize(&url, at, &output).await,
        Commands::WebSummarize { url, history } => summarize::run_web_summarize(url.as_deref(), history, &output).await,
        Commands::Focus { feed, samples } => focus::run_focus(feed, samples, &output).await,
        Commands::Timer {
            sessions,
            focus_minutes,
            break_minutes,
            long_break_minutes,
        } => timer::run_timer(sessions, focus_minutes, break_minutes, long_break_minutes, &output).await,
        Commands::Quiz { url, at } => quiz::run_quiz(&url, at, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, credentials } => clear::run_clear(all, credentials, &output).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        output.error(format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
