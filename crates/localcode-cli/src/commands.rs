//! Subcommand definitions.

use clap::{Args, Subcommand};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the proxy server (default)
    Serve(ServeArgs),

    /// List backend models and the model that would be auto-selected
    Models {
        /// Backend base URL, overriding BACKEND_URL
        #[arg(long)]
        backend_url: Option<String>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Serve(ServeArgs::default())
    }
}

/// Flags for `serve`; each overrides its environment variable.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// Address to bind, overriding HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding PORT
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Backend base URL, overriding BACKEND_URL
    #[arg(long)]
    pub backend_url: Option<String>,
}
