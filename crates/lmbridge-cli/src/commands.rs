//! Subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Write default engine configuration files if they are missing
    Init,

    /// Print the local directory of each model component
    Find {
        /// Model id, `+`-joined for paired models
        model: String,
    },

    /// Check that every expected model file is present
    Check {
        /// Model id, `+`-joined for paired models
        model: String,
    },

    /// Download missing or incomplete model components
    Fetch {
        /// Model id, `+`-joined for paired models
        model: String,
        /// Repository hosts to try in order (defaults to the primary host, then the mirror)
        #[arg(long = "host")]
        hosts: Vec<String>,
        /// Maximum number of files transferred at once
        #[arg(long, default_value_t = 4)]
        jobs: usize,
    },

    /// Chat with a model on the native engine
    Chat(ChatArgs),
}

#[derive(Args)]
pub struct ChatArgs {
    /// Model id, `+`-joined for paired models
    pub model: String,

    /// User message
    pub prompt: String,

    /// Optional system message sent before the prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Engine shared library exporting the `powerserve_*` entry points
    #[arg(long = "engine-lib", env = "LMBRIDGE_ENGINE_LIB")]
    pub engine_lib: PathBuf,

    /// Directory holding the engine's accelerator libraries
    #[arg(long = "lib-dir", env = "LMBRIDGE_LIB_DIR")]
    pub lib_dir: PathBuf,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub top_p: Option<f64>,

    #[arg(long)]
    pub presence_penalty: Option<f64>,

    #[arg(long)]
    pub frequency_penalty: Option<f64>,

    /// Wait for the whole answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,
}
