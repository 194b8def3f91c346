use clap::Parser;

#[derive(Parser)]
#[command(
    name = "solana-launch-checker",
    version,
    about = "Find the earliest on-chain activity timestamp for a program address"
)]
pub struct Cli {
    #[arg(help = "Program address to inspect")]
    pub address: String,
    #[arg(long, help = "Log page fetches and retry attempts")]
    pub verbose: bool,
}
