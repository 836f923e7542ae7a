use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered builtins, optionally for one module.
    List {
        /// Restrict the listing to one module.
        #[arg(long, value_name = "MODULE")]
        module: Option<String>,
    },

    /// Show one builtin's full signature.
    Describe {
        /// Qualified name, e.g. `slack.send_text_message`.
        name: String,
    },

    /// Invoke a builtin and print the marshaled result as JSON.
    Call {
        /// Qualified name, e.g. `json.encode`.
        name: String,

        /// Positional arguments as a JSON array, e.g. `["C123", "hello"]`.
        #[arg(long, value_name = "JSON")]
        args: Option<String>,

        /// Keyword arguments as a JSON object, e.g. `{"thread_ts": "171.001"}`.
        #[arg(long, value_name = "JSON")]
        kwargs: Option<String>,

        /// Deadline for the call, in seconds. Unbounded without it.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
    },
}
