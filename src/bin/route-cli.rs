use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Client for the Searoute Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a maritime route between two points
    Route {
        /// Origin as lon,lat
        #[arg(long, allow_hyphen_values = true)]
        from: String,
        /// Destination as lon,lat
        #[arg(long, allow_hyphen_values = true)]
        to: String,
        /// Distance unit (nm, km, mi, m)
        #[arg(long)]
        units: Option<String>,
    },
    /// Check gateway liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Route { from, to, units } => {
            let mut body = json!({
                "origin": parse_point(&from)?,
                "destination": parse_point(&to)?,
            });
            if let Some(units) = units {
                body["units"] = Value::String(units);
            }
            let res = client
                .post(format!("{}/route", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                println!("{}", text);
            } else {
                eprintln!("Error: gateway returned status {}", status);
                eprintln!("Response: {}", text);
            }
        }
    }

    Ok(())
}

fn parse_point(raw: &str) -> Result<[f64; 2], Box<dyn std::error::Error>> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected lon,lat but got {raw:?}"))?;
    Ok([lon.trim().parse()?, lat.trim().parse()?])
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
