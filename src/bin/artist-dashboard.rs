use artist_dashboard::dashboard::{self, AppState};
use artist_dashboard::{ArtistSummarizer, DashboardConfig, SpotifyConfig, TrackRecord};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "artist-dashboard")]
#[command(about = "Spotify artist discography dashboard", long_about = None)]
struct Cli {
    /// Spotify client id (falls back to SPOTIFY_CLIENT_ID, then client_id)
    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// Spotify client secret (falls back to SPOTIFY_CLIENT_SECRET, then client_secret)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Market used when listing an artist's releases
    #[arg(short, long, default_value = "US")]
    market: String,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web dashboard
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8050")]
        bind: SocketAddr,
    },
    /// Print an artist's career summary
    Summary {
        /// Artist name to search for
        artist: String,

        /// Also print every track
        #[arg(short, long)]
        tracks: bool,
    },
    /// Rank an artist against similar acts
    Peers {
        /// Artist name to search for
        artist: String,

        /// Number of acts in the comparison network
        #[arg(short, long, default_value_t = 100)]
        size: usize,
    },
}

fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn print_row(columns: &[&str], cells: &[String]) {
    for (column, cell) in columns.iter().zip(cells) {
        println!("  {:<24} {}", column, cell);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = SpotifyConfig::from_args_or_env(cli.client_id.clone(), cli.client_secret.clone())?
        .with_market(&cli.market);
    let summarizer = ArtistSummarizer::from_config(config)?;

    match &cli.command {
        Commands::Serve { bind } => {
            let dashboard_config = DashboardConfig {
                bind: *bind,
                ..DashboardConfig::default()
            };
            dashboard::run(AppState::new(summarizer, dashboard_config)).await?;
        }
        Commands::Summary { artist, tracks } => {
            let today = chrono::Local::now().date_naive();
            let discography = summarizer.get_artist_discography(artist, today).await?;

            println!("{}", discography.artist);
            print_row(
                &artist_dashboard::ArtistSummary::COLUMNS,
                &discography.summary.cells(),
            );

            if *tracks {
                println!();
                println!("{}", TrackRecord::COLUMNS.join("\t"));
                for record in &discography.tracks {
                    println!("{}", record.cells().join("\t"));
                }
            }
        }
        Commands::Peers { artist, size } => {
            println!("Comparing {} to {} similar acts...", artist, size);
            let related = DashboardConfig::default().related_per_artist;
            let rankings = summarizer.compare_to_peers(artist, *size, related).await?;

            println!("  spot_followers_ranking   {}", rankings.spot_followers_ranking);
            println!("  spot_popularity_ranking  {}", rankings.spot_popularity_ranking);
            if rankings.network_size < *size {
                println!("  (only {} similar acts found)", rankings.network_size);
            }
        }
    }

    Ok(())
}
