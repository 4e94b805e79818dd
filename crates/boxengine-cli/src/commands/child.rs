//! `boxengine child` — container-side setup after re-execution.
//!
//! Not part of the operator interface; `run` invokes it through
//! `/proc/self/exe` inside the new namespaces.

use clap::Args;
use boxengine_common::config::ChildConfig;

/// Arguments for the `child` command.
#[derive(Args, Debug)]
pub struct ChildArgs {
    /// Encoded child configuration produced by `run`.
    #[arg(long)]
    pub config: String,

    /// Command to execute, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<String>,
}

/// Executes the `child` command.
///
/// Never returns on success: the process becomes the target command.
///
/// # Errors
///
/// Returns an error if the configuration is malformed or any setup step
/// fails.
pub fn execute(args: &ChildArgs) -> anyhow::Result<()> {
    let config = ChildConfig::from_json(&args.config)?;
    let Err(e) = boxengine_runtime::child::enter(&config, &args.command);
    Err(e.into())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::commands::{Cli, Command, LogFormat};

    #[test]
    fn re_exec_layout_parses() {
        let cli = Cli::try_parse_from([
            "boxengine",
            "--log-format",
            "json",
            "child",
            "--config",
            "{}",
            "--",
            "/bin/echo",
            "--config",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Child(args) = cli.command else {
            unreachable!("expected child subcommand");
        };
        assert_eq!(args.config, "{}");
        assert_eq!(args.command, ["/bin/echo", "--config"]);
    }
}
