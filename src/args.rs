use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse an interface file and print the document as JSON.
    Parse {
        /// Interface file path.
        file: PathBuf,
    },

    /// Resolve a scope's types and print the canonical registry as JSON.
    Types {
        /// Interface file path.
        file: PathBuf,

        /// Resolve within this service's scope (its local types shadow
        /// program-level ones). Defaults to the program scope.
        #[arg(long, value_name = "NAME")]
        service: Option<String>,
    },

    /// Inspect or build message headers.
    #[command(subcommand)]
    Header(HeaderCommand),

    /// Encode a call payload for a service function.
    Call {
        /// Interface file path.
        file: PathBuf,

        /// Service to call.
        #[arg(long, value_name = "NAME")]
        service: String,

        /// Function within the service.
        #[arg(long, value_name = "NAME")]
        func: String,

        /// Route of the exposed service instance.
        #[arg(long, default_value_t = 0)]
        route_idx: u8,

        /// Pre-encoded argument body, hex. Empty for no-argument calls.
        #[arg(long, value_name = "HEX", default_value = "")]
        args_hex: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum HeaderCommand {
    /// Decode the header at the front of a hex-encoded payload.
    Decode {
        /// Payload bytes, hex.
        hex: String,
    },

    /// Build a header from its fields and print the bytes as hex.
    Encode {
        /// Interface id (16 hex digits, 0x prefix optional).
        #[arg(long, value_name = "HEX")]
        interface_id: String,

        /// Entry id within the interface.
        #[arg(long, default_value_t = 0)]
        entry_id: u16,

        /// Route of the exposed service instance.
        #[arg(long, default_value_t = 0)]
        route_idx: u8,
    },
}
