use clap::Args;
use califit_core::format::{format_clock, format_elapsed};

#[derive(Args)]
pub struct FormatArgs {
    /// Seconds to format; negative values render as rest overtime
    #[arg(allow_negative_numbers = true)]
    seconds: i64,
    /// Use the workout elapsed-time format (H:MM:SS)
    #[arg(long)]
    elapsed: bool,
}

pub fn run(args: FormatArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.elapsed {
        let seconds = u64::try_from(args.seconds)
            .map_err(|_| format!("elapsed time cannot be negative: {}", args.seconds))?;
        println!("{}", format_elapsed(seconds));
    } else {
        println!("{}", format_clock(args.seconds));
    }
    Ok(())
}
