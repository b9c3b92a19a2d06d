use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod host;
mod terminal_cues;

#[derive(Parser)]
#[command(name = "califit", version, about = "Califit workout timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single exercise or rest interval
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Guided workouts from a plan file
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Format seconds the way the timer displays them
    Format(commands::format::FormatArgs),
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CALIFIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Format(args) => commands::format::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "califit", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
