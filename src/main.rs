use anyhow::Result;
use clap::{Parser, Subcommand};
use playlist_logger::config::DOTENV_FILE;
use playlist_logger::model::{parse_target, RecommendationRequest, SEED_GENRES};
use playlist_logger::recommend::create_recommended_playlist;
use playlist_logger::spotify::SpotifyClient;
use playlist_logger::{CollectConfig, Collector, Credentials};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "playlist-logger")]
#[command(about = "Snapshot public playlists and log every change", long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Snapshot users' profiles and public playlists
    Scrape {
        /// User id, the last part of https://open.spotify.com/user/<id> (repeatable)
        #[arg(short = 'u', long = "user", required = true)]
        users: Vec<String>,

        /// Directory holding the snapshots
        #[arg(short = 'd', long, default_value = "data")]
        data_dir: String,
    },

    /// Create a playlist of tracks recommended from the end of another one
    Recommend {
        /// Playlist whose last tracks seed the recommendations
        #[arg(short = 'p', long)]
        playlist: String,

        /// Owner of the new playlist
        #[arg(short = 'u', long)]
        user: String,

        /// Name of the new playlist
        #[arg(short = 'n', long)]
        name: String,

        /// Number of tracks to add
        #[arg(short = 'c', long, default_value = "10")]
        count: usize,

        /// Seed genre, see `genres` (repeatable)
        #[arg(short = 'g', long = "genre")]
        genres: Vec<String>,

        /// Seed artist id (repeatable)
        #[arg(short = 'a', long = "artist")]
        artists: Vec<String>,

        /// Tunable attribute as FEATURE=VALUE, sent as target_FEATURE (repeatable)
        #[arg(short = 't', long = "target")]
        targets: Vec<String>,
    },

    /// List the genres accepted as recommendation seeds
    Genres,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Scrape { users, data_dir } => {
            let client = connect()?;

            // Expand ~ in paths
            let data_dir = PathBuf::from(shellexpand::tilde(&data_dir).as_ref());

            let config = CollectConfig::new(data_dir).with_users(users);
            let collector = Collector::new(config, client);
            let summary = collector.run()?;

            log::info!(
                "{} snapshot(s) updated, {} unchanged",
                summary.written.len(),
                summary.unchanged
            );
        }
        Command::Recommend {
            playlist,
            user,
            name,
            count,
            genres,
            artists,
            targets,
        } => {
            let mut request = RecommendationRequest::new(count)
                .with_genres(genres)
                .with_artists(artists);
            for target in &targets {
                let (feature, value) = parse_target(target)?;
                request = request.with_target(feature, value);
            }

            let client = connect()?;
            let id = create_recommended_playlist(&client, &playlist, &name, &user, request)?;
            log::info!("New playlist: https://open.spotify.com/playlist/{}", id);
        }
        Command::Genres => {
            for genre in SEED_GENRES {
                println!("{}", genre);
            }
        }
    }

    Ok(())
}

fn connect() -> Result<SpotifyClient> {
    let credentials = Credentials::load_from(Path::new(DOTENV_FILE))?;
    Ok(SpotifyClient::new(&credentials)?)
}
