use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the MCP server
    Start(CommandArguments),
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct CommandArguments {
    /// Enable stdio transport
    #[arg(long, env = "CAREERPATH_ENABLE_STDIO", default_value_t = true)]
    pub enable_stdio: bool,

    /// Enable streamable HTTP transport
    #[arg(long, env = "CAREERPATH_ENABLE_HTTP", default_value_t = true)]
    pub enable_http: bool,

    /// Enable dedicated SSE transport
    #[arg(long, env = "CAREERPATH_ENABLE_SSE", default_value_t = true)]
    pub enable_sse: bool,

    /// HTTP bind address (streamable HTTP)
    #[arg(long, env = "CAREERPATH_HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub http_addr: String,

    /// Dedicated SSE bind address
    #[arg(long, env = "CAREERPATH_SSE_ADDR", default_value = "0.0.0.0:8081")]
    pub sse_addr: String,

    /// Storage file path (defaults to ~/.careerpath/data.json)
    #[arg(long, env = "CAREERPATH_STORAGE")]
    pub storage_path: Option<PathBuf>,

    /// Acting user for this deployment. Omitted: queries return empty
    /// results and mutations are rejected as unauthorized.
    #[arg(long, env = "CAREERPATH_USER")]
    pub user: Option<String>,
}

impl CommandArguments {
    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enable_stdio && !self.enable_http && !self.enable_sse {
            return Err("Enable at least one transport (stdio, http, or sse)".to_string());
        }

        if self.enable_http {
            self.http_addr
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid CAREERPATH_HTTP_ADDR '{}': {e}", self.http_addr))?;
        }
        if self.enable_sse {
            self.sse_addr
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid CAREERPATH_SSE_ADDR '{}': {e}", self.sse_addr))?;
        }
        if let Some(user) = &self.user {
            if user.trim().is_empty() {
                return Err("CAREERPATH_USER cannot be blank".to_string());
            }
        }
        Ok(())
    }
}
