use anyhow::Result;
use clap::Parser;
use restrec::{init_tracing, services::ingest, AppState, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the restaurant similarity model from a CSV file", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// CSV file with one restaurant per row
    #[arg(short, long)]
    dataset: PathBuf,

    /// Print recommendations for this restaurant after training
    #[arg(short, long)]
    recommend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &args.log_level);
    }
    init_tracing();

    info!("Starting restaurant similarity trainer");

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    let state = AppState::new(config);

    let dataset = ingest::read_csv_path(&args.dataset)?;
    let (report, assignment) = state.load_dataset(dataset).await;
    println!("Columns detected: {:?}", report.columns);
    let assignment = assignment?;
    println!("Restaurant name column detected: {}", assignment.name);

    let training = state.train().await?;
    println!(
        "Model training completed: {} restaurants, {} terms, {}ms",
        training.rows, training.vocabulary_size, training.duration_ms
    );

    if let Some(restaurant) = args.recommend {
        let response = state.recommend(&restaurant).await?;
        println!("Recommended Restaurants:");
        for item in &response.recommendations {
            println!("- {} ({:.3})", item.name, item.score);
        }
    }

    Ok(())
}
