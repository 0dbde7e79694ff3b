use clap::{Args, Subcommand};
use color_eyre::Section;
use nickel_bridge::render::to_json;
use nickel_bridge::{Backend, Error, EvaluatorConfig, ExportFormat, Gateway, Input, Output};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate source text given on the command line
    Eval {
        /// Nickel source, e.g. '{ port = 8080 }'
        source: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Evaluate a file; its imports resolve relative to the file
    File {
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
pub struct OutputArgs {
    /// Output format (json, yaml, toml, raw, or binary for a decoded value)
    #[arg(short, long, value_name = "FORMAT", default_value = "binary")]
    format: ExportFormat,

    /// Print the decoded value as JSON instead of Nickel syntax
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to the nickel executable
    #[arg(long, value_name = "PATH")]
    nickel: Option<PathBuf>,
}

impl Commands {
    pub fn execute(self) -> eyre::Result<()> {
        match self {
            Commands::Eval { source, output } => {
                let gateway = output.gateway()?;
                let result = gateway
                    .evaluate(Input::Source(&source), output.format)
                    .map_err(report)?;
                output.print(result)
            }
            Commands::File { path, output } => {
                let gateway = output.gateway()?;
                let result = gateway
                    .evaluate(Input::File(&path), output.format)
                    .map_err(report)?;
                output.print(result)
            }
        }
    }
}

impl OutputArgs {
    fn gateway(&self) -> eyre::Result<Gateway<Box<dyn Backend>>> {
        let mut config = EvaluatorConfig::from_env().map_err(report)?;
        if let Some(nickel) = &self.nickel {
            config = config.executable(nickel);
        }
        let backend = select_backend(&config).map_err(report)?;
        tracing::debug!(backend = backend.name(), "selected evaluator backend");
        Gateway::with_config(backend, &config).map_err(report)
    }

    fn print(&self, output: Output) -> eyre::Result<()> {
        let text = match output {
            Output::Value(value) if self.json => to_json(&value).map_err(report)?,
            Output::Value(value) => format!("{value}\n"),
            Output::Text(text) if text.ends_with('\n') => text,
            Output::Text(text) => text + "\n",
        };
        io::stdout().lock().write_all(text.as_bytes())?;
        Ok(())
    }
}

#[cfg(feature = "linked")]
fn select_backend(_config: &EvaluatorConfig) -> nickel_bridge::Result<Box<dyn Backend>> {
    use nickel_bridge::{LinkedEvaluator, NativeBackend};

    Ok(Box::new(NativeBackend::new(LinkedEvaluator)))
}

#[cfg(not(feature = "linked"))]
fn select_backend(config: &EvaluatorConfig) -> nickel_bridge::Result<Box<dyn Backend>> {
    Ok(Box::new(nickel_bridge::SubprocessBackend::new(config)?))
}

/// Carry the diagnostic's help text into the report
fn report(err: Error) -> eyre::Report {
    let help = miette::Diagnostic::help(&err).map(|help| help.to_string());
    let report = eyre::Report::new(err);
    match help {
        Some(help) => report.suggestion(help),
        None => report,
    }
}
