use clap::Parser;
use env_logger::Env;
use pqbms::BmsClient;

#[derive(Parser)]
#[command(name = "pqbms")]
#[command(about = "Read telemetry from a PowerQueen LiFePO4 BMS over Bluetooth Low Energy")]
struct Cli {
    /// Advertised Bluetooth name of the battery
    device: String,

    /// Read the BMS telemetry and print it as JSON
    #[arg(long)]
    bms: bool,

    /// List device GATT services and characteristics
    #[arg(short, long)]
    services: bool,

    /// Verbose logs
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if !cli.bms && !cli.services {
        log::warn!("nothing to do, pass --bms or --services");
        return Ok(());
    }

    let mut client = BmsClient::new(&cli.device).await?;

    if cli.services {
        client.print_services().await?;
        client.stop().await?;
        return Ok(());
    }

    let telemetry = client.fetch_telemetry().await?;
    println!("{}", serde_json::to_string_pretty(&telemetry)?);

    client.stop().await?;
    Ok(())
}
