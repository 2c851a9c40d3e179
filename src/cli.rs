// KiddieFlix CLI binary

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use anyhow::Result;

use kiddieflix_lib::catalog::Targeting;
use kiddieflix_lib::constants::EXPORT_FILENAME;
use kiddieflix_lib::db::app_db::get_app_db_path;
use kiddieflix_lib::identity::{FixedPin, PinPrompt, ProfileEdit};
use kiddieflix_lib::player::{self, HeadlessPlayer, PlayerSession};
use kiddieflix_lib::{AppState, SqliteStore};

#[derive(Parser)]
#[command(name = "kiddieflix")]
#[command(about = "KiddieFlix - A kid-safe video bookmark list", long_about = None)]
#[command(version)]
struct Cli {
    /// App database path (defaults to ~/.kiddieflix/app.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Parent PIN; read from stdin when needed if omitted
    #[arg(long, global = true)]
    pin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active profile and library counts
    Status,

    /// List profiles
    Profiles,

    /// Switch the active profile
    Select {
        /// Profile ID
        id: String,
    },

    /// Create a profile
    AddProfile {
        /// Display name (max 18 characters)
        name: String,
    },

    /// Rename, recolor or change the emoji of a profile
    EditProfile {
        /// Profile ID
        id: String,
        #[command(subcommand)]
        edit: EditAction,
    },

    /// Delete a profile
    DeleteProfile {
        /// Profile ID
        id: String,
    },

    /// List videos visible to the active profile
    List {
        /// Only the active profile's favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Toggle a favorite for the active profile
    Favorite {
        /// Video ID
        video_id: String,
    },

    /// Add a video by URL
    Add {
        /// YouTube URL
        url: String,
        /// Video title
        #[arg(short, long, default_value = "")]
        title: String,
        /// Restrict to these profile IDs (all profiles if omitted)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,
    },

    /// Delete videos
    Delete {
        /// Video IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every video
    Clear,

    /// Export profiles, videos and favorites to JSON
    Export {
        /// Output file (defaults to kiddieflix-data.json)
        path: Option<PathBuf>,
    },

    /// Import a previously exported JSON file
    Import {
        /// Input file
        path: PathBuf,
    },

    /// Manage the parent PIN
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },

    /// Play a video
    Play {
        /// Video ID
        video_id: String,
    },
}

#[derive(Subcommand)]
enum EditAction {
    Rename { name: String },
    Color { color: String },
    Emoji { emoji: String },
}

#[derive(Subcommand)]
enum PinAction {
    /// Set a PIN (4-8 characters)
    Set,
    /// Change the PIN
    Change,
    /// Remove the PIN
    Remove,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut state = open_state(cli.db)?;
    let mut prompt = pin_prompt(cli.pin.clone());

    match cli.command {
        Commands::Status => cmd_status(&state),
        Commands::Profiles => cmd_profiles(&state),
        Commands::Select { id } => cmd_select(&mut state, &id, prompt.as_mut()),
        Commands::AddProfile { name } => cmd_add_profile(&mut state, &name, prompt.as_mut()),
        Commands::EditProfile { id, edit } => {
            let edit = match edit {
                EditAction::Rename { name } => ProfileEdit::Rename(name),
                EditAction::Color { color } => ProfileEdit::Recolor(color),
                EditAction::Emoji { emoji } => ProfileEdit::Reemoji(emoji),
            };
            cmd_edit_profile(&mut state, &id, edit, prompt.as_mut())
        }
        Commands::DeleteProfile { id } => cmd_edit_profile(&mut state, &id, ProfileEdit::Delete, prompt.as_mut()),
        Commands::List { favorites } => cmd_list(&mut state, favorites),
        Commands::Favorite { video_id } => cmd_favorite(&mut state, &video_id),
        Commands::Add { url, title, profiles } => cmd_add(&mut state, &url, &title, profiles, prompt.as_mut()),
        Commands::Delete { ids } => cmd_delete(&mut state, &ids, prompt.as_mut()),
        Commands::Clear => cmd_clear(&mut state, prompt.as_mut()),
        Commands::Export { path } => cmd_export(&state, path, prompt.as_mut()),
        Commands::Import { path } => cmd_import(&mut state, &path, prompt.as_mut()),
        Commands::Pin { action } => cmd_pin(&mut state, action, cli.pin),
        Commands::Play { video_id } => cmd_play(&state, &video_id),
    }
}

fn cmd_status(state: &AppState<SqliteStore>) -> Result<()> {
    println!("Profile:     {}", state.current_profile_label());
    println!("Parent PIN:  {}", if state.has_pin() { "set" } else { "not set" });
    println!("Profiles:    {}", state.profiles().len());
    println!("Videos:      {} ({} visible)", state.videos().len(), state.visible_videos().len());
    Ok(())
}

fn cmd_profiles(state: &AppState<SqliteStore>) -> Result<()> {
    let current = state.current_profile_id();

    for profile in state.profiles() {
        let marker = if current == Some(profile.id.as_str()) { "*" } else { " " };
        println!("{} {} {:<18}  {:<8}  {}", marker, profile.avatar(), profile.name, profile.pill_color(), profile.id);
    }

    if current.is_none() {
        println!();
        println!("No active profile. Use 'kiddieflix select <id>' to pick one.");
    }

    Ok(())
}

fn cmd_select(state: &mut AppState<SqliteStore>, id: &str, prompt: &mut dyn PinPrompt) -> Result<()> {
    state.select_profile(id, prompt)?;
    println!("Active profile: {}", state.current_profile_label());
    Ok(())
}

fn cmd_add_profile(state: &mut AppState<SqliteStore>, name: &str, prompt: &mut dyn PinPrompt) -> Result<()> {
    let profile = state.add_profile(name, prompt)?;
    println!("Added profile {} {} ({})", profile.avatar(), profile.name, profile.id);
    Ok(())
}

fn cmd_edit_profile(
    state: &mut AppState<SqliteStore>,
    id: &str,
    edit: ProfileEdit,
    prompt: &mut dyn PinPrompt,
) -> Result<()> {
    let deleting = matches!(edit, ProfileEdit::Delete);
    state.edit_profile(id, edit, prompt)?;

    if deleting {
        println!("Deleted profile {}", id);
    } else if let Some(profile) = state.profile(id) {
        println!("Updated profile {} {} ({})", profile.avatar(), profile.name, profile.pill_color());
    }
    Ok(())
}

fn cmd_list(state: &mut AppState<SqliteStore>, favorites: bool) -> Result<()> {
    if favorites && !state.favorites_only() {
        state.toggle_favorites_only()?;
    }

    let videos = state.visible_videos();
    println!("{} ({} videos)", state.current_profile_label(), videos.len());
    println!();

    if videos.is_empty() {
        if favorites {
            println!("No favorites yet. Use 'kiddieflix favorite <id>' to add one.");
        } else {
            println!("No videos found. Use 'kiddieflix add <url>' to add one.");
        }
        return Ok(());
    }

    println!("{:>11}  {:>3}  {:<10}  {}", "ID", "Fav", "For", "Title");
    println!("{}", "-".repeat(60));

    for video in videos {
        let fav = if state.is_favorite(&video.id) { "*" } else { "" };
        let audience = match &video.profiles {
            None => "everyone".to_string(),
            Some(ids) => format!("{} profile(s)", ids.len()),
        };

        let title = video.display_title();
        let title = if title.chars().count() > 40 {
            format!("{}...", title.chars().take(37).collect::<String>())
        } else {
            title.to_string()
        };

        println!("{:>11}  {:>3}  {:<10}  {}", video.id, fav, audience, title);
    }

    Ok(())
}

fn cmd_favorite(state: &mut AppState<SqliteStore>, video_id: &str) -> Result<()> {
    let now_favorite = state.toggle_favorite_for_current(video_id)?;
    if now_favorite {
        println!("Added {} to {}'s favorites", video_id, state.current_profile_label());
    } else {
        println!("Removed {} from {}'s favorites", video_id, state.current_profile_label());
    }
    Ok(())
}

fn cmd_add(
    state: &mut AppState<SqliteStore>,
    url: &str,
    title: &str,
    profiles: Vec<String>,
    prompt: &mut dyn PinPrompt,
) -> Result<()> {
    state.unlock_parent_panel(prompt)?;

    let targeting = if profiles.is_empty() {
        Targeting::AllProfiles
    } else {
        Targeting::Profiles(profiles)
    };

    let video = state.add_video(url, title, targeting)?;
    println!("Added {} \"{}\"", video.id, video.display_title());
    Ok(())
}

fn cmd_delete(state: &mut AppState<SqliteStore>, ids: &[String], prompt: &mut dyn PinPrompt) -> Result<()> {
    state.enter_selection(prompt)?;

    if let Err(e) = state.select_ids(ids) {
        state.exit_selection();
        return Err(e.into());
    }

    let removed = state.delete_selected()?;
    println!("Deleted {} video(s)", removed);
    Ok(())
}

fn cmd_clear(state: &mut AppState<SqliteStore>, prompt: &mut dyn PinPrompt) -> Result<()> {
    state.unlock_parent_panel(prompt)?;
    let removed = state.clear_videos()?;
    println!("Cleared {} video(s)", removed);
    Ok(())
}

fn cmd_export(state: &AppState<SqliteStore>, path: Option<PathBuf>, prompt: &mut dyn PinPrompt) -> Result<()> {
    state.unlock_parent_panel(prompt)?;
    let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILENAME));
    state.export_to_file(&path)?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn cmd_import(state: &mut AppState<SqliteStore>, path: &Path, prompt: &mut dyn PinPrompt) -> Result<()> {
    state.unlock_parent_panel(prompt)?;

    let summary = state
        .import_from_file(path)
        .map_err(|e| anyhow::anyhow!("Import failed: {}", e))?;

    println!("Imported from {}:", path.display());
    println!("  Videos:     {}", summary.videos);
    match summary.profiles {
        Some(count) => println!("  Profiles:   {}", count),
        None => println!("  Profiles:   unchanged"),
    }
    println!("  Favorites:  {}", if summary.favorites_replaced { "replaced" } else { "unchanged" });
    Ok(())
}

fn cmd_pin(state: &mut AppState<SqliteStore>, action: PinAction, current: Option<String>) -> Result<()> {
    let current_pin = || current.clone().or_else(|| read_pin("Current parent PIN:")).unwrap_or_default();

    match action {
        PinAction::Set => {
            let code = read_pin("New parent PIN:").unwrap_or_default();
            let confirm = read_pin("Confirm parent PIN:").unwrap_or_default();
            state.setup_pin(&code, &confirm)?;
            println!("Parent PIN set");
        }
        PinAction::Change => {
            let old = current_pin();
            let code = read_pin("New parent PIN:").unwrap_or_default();
            let confirm = read_pin("Confirm parent PIN:").unwrap_or_default();
            state.change_pin(&old, &code, &confirm)?;
            println!("Parent PIN changed");
        }
        PinAction::Remove => {
            state.remove_pin(&current_pin())?;
            println!("Parent PIN removed");
        }
    }
    Ok(())
}

fn cmd_play(state: &AppState<SqliteStore>, video_id: &str) -> Result<()> {
    let video = state
        .visible_videos()
        .into_iter()
        .find(|v| v.id == video_id)
        .ok_or_else(|| anyhow::anyhow!("Video {} not found for {}", video_id, state.current_profile_label()))?;

    let session = PlayerSession::open(HeadlessPlayer::default(), &video.id);
    println!("Playing:     {}", video.display_title());
    println!("Watch:       {}", player::watch_url(session.video_id()));
    println!("Thumbnail:   {}", player::thumbnail_url(session.video_id()));
    session.close();

    Ok(())
}

// Helper functions

fn open_state(db: Option<PathBuf>) -> Result<AppState<SqliteStore>> {
    let db_path = match db {
        Some(path) => path,
        None => get_app_db_path()?,
    };
    let store = SqliteStore::open(&db_path)?;
    let state = AppState::load(store)?;
    Ok(state)
}

/// `--pin` answers every prompt; otherwise ask on stdin.
fn pin_prompt(pin: Option<String>) -> Box<dyn PinPrompt> {
    match pin {
        Some(code) => Box::new(FixedPin(Some(code))),
        None => Box::new(read_pin),
    }
}

/// Ask on stderr, read one line from stdin. Empty input or EOF cancels.
fn read_pin(message: &str) -> Option<String> {
    eprint!("{} ", message);
    io::stderr().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let code = line.trim();
            if code.is_empty() {
                None
            } else {
                Some(code.to_string())
            }
        }
    }
}
