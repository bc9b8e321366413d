use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// List the attached controller devices.
    Devices,
    /// Watch the bound controller and print control presses.
    Watch,
    /// Run the interactive remapping session and save the result.
    Configure,
}

/// Controller input probe: inspect devices, watch controls, capture
/// configurations.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// The preferences file to read and write
    #[arg(short, long, default_value = "joystick.yaml")]
    pub prefs: String,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
