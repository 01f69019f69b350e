use clap::{Args, Parser, Subcommand};
use reelname::TrackSpec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelname")]
#[command(
    author,
    version,
    about = "Batch rename and relink the audio media of an editing timeline"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which project, timeline and tracks to work on.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Project snapshot file (JSON)
    #[arg(short, long)]
    pub project: PathBuf,

    /// Timeline name
    #[arg(short, long)]
    pub timeline: String,

    /// Audio tracks to read: "all" or a list such as "1,3"
    #[arg(long, default_value = "all")]
    pub tracks: TrackSpec,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the clips on the selected audio tracks
    Inspect {
        #[command(flatten)]
        target: Target,
    },

    /// List the audio tracks of a timeline
    Tracks {
        /// Project snapshot file (JSON)
        #[arg(short, long)]
        project: PathBuf,

        /// Timeline name
        #[arg(short, long)]
        timeline: String,
    },

    /// Show the renames a names file would produce, without changing anything
    Plan {
        #[command(flatten)]
        target: Target,

        /// TOML file with a [names] table
        #[arg(short, long)]
        names: PathBuf,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename files, relink the project and rename clips
    Apply {
        #[command(flatten)]
        target: Target,

        /// TOML file with a [names] table
        #[arg(short, long, required_unless_present = "interactive")]
        names: Option<PathBuf>,

        /// Prompt for a base name per media file
        #[arg(short, long, conflicts_with = "names")]
        interactive: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Write the batch report as JSON (overrides report.path)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
