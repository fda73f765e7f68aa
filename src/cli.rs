//! Command-line interface.
//!
//! With no subcommand the binary starts the TUI. Subcommands run one
//! operation against the backends and print the result.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args as ClapArgs, Parser, Subcommand};
use futures::StreamExt;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::auth::{AuthError, AuthState, Registration};
use crate::catalog::{fallback_movies, Movie, MovieId};
use crate::config::Config;
use crate::dashboard::{self, DashboardFilter};
use crate::gesture::Rating;
use crate::preferences::Preferences;
use crate::remote;
use crate::session::UserSession;
use crate::social::{
    self, joined_label, FriendsState, ProfileState, SocialClient, UpdateProfile,
    DEFAULT_SEARCH_PAGE_SIZE,
};
use crate::storage::Storage;
use crate::tmdb::TmdbClient;
use crate::util::sanitize_line;

/// Concurrent detail lookups when printing the dashboard.
const DETAIL_CONCURRENCY: usize = 4;

#[derive(Parser, Debug)]
#[command(
    name = "reelswipe",
    version,
    about = "Swipe through movies in the terminal and share taste with friends"
)]
pub struct Args {
    /// Reset the database (delete and recreate)
    #[arg(long)]
    pub reset_db: bool,

    /// Keep everything in memory for this run
    #[arg(long, conflicts_with = "reset_db")]
    pub ephemeral: bool,

    /// Config file to use instead of ~/.config/reelswipe/config.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in to the social backend
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Defaults to the password
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show who is signed in
    Whoami,
    /// Friends and friend requests
    #[command(subcommand)]
    Friends(FriendsCommand),
    /// Your profile and user search
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Print rated movies
    Dashboard(DashboardArgs),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FriendsCommand {
    /// List friends
    List,
    /// List pending requests, both directions
    Requests,
    /// Send a friend request
    Add {
        user_id: String,
        #[arg(long)]
        message: Option<String>,
    },
    Accept {
        request_id: String,
    },
    Reject {
        request_id: String,
    },
    Remove {
        friend_id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProfileCommand {
    /// Show your profile, or another user's
    Show { user_id: Option<String> },
    Update {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        public: Option<bool>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        genres: Option<Vec<String>>,
    },
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_SEARCH_PAGE_SIZE)]
        size: u32,
    },
    /// Upload an avatar image
    Avatar { path: PathBuf },
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Default)]
pub struct DashboardArgs {
    /// Match title, director or cast
    #[arg(long)]
    pub search: Option<String>,
    /// Required genre, repeatable
    #[arg(long = "genre")]
    pub genres: Vec<String>,
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f32,
    /// seen-liked, seen-disliked, not-seen-liked or not-seen-disliked; repeatable
    #[arg(long = "status", value_parser = parse_rating)]
    pub statuses: Vec<Rating>,
}

fn parse_rating(s: &str) -> Result<Rating, String> {
    Rating::from_str_name(s).ok_or_else(|| {
        let names: Vec<_> = Rating::ALL.iter().map(|r| r.as_str()).collect();
        format!("expected one of {}", names.join(", "))
    })
}

impl DashboardArgs {
    fn filter(&self) -> DashboardFilter {
        DashboardFilter {
            search: self.search.clone().unwrap_or_default(),
            genres: self.genres.clone(),
            min_rating: self.min_rating,
            statuses: self.statuses.clone(),
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Everything a subcommand needs, restored from storage.
pub struct CommandRunner {
    storage: Storage,
    social: SocialClient,
    tmdb: TmdbClient,
    auth: AuthState,
    session: UserSession,
}

impl CommandRunner {
    /// Build the clients and restore the sign-in and session from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built, a configured
    /// base URL does not parse, or the stored identity cannot be read.
    pub async fn open(config: &Config, storage: Storage) -> Result<Self> {
        let http = remote::build_client().context("Failed to build HTTP client")?;
        let api_key = config
            .tmdb_api_key()
            .unwrap_or_else(|| secrecy::SecretString::from(String::new()));
        let tmdb = TmdbClient::new(http.clone(), &config.tmdb_base_url, api_key)
            .context("Invalid tmdb_base_url")?;
        let mut social =
            SocialClient::new(http, &config.backend_url).context("Invalid backend_url")?;

        let auth = AuthState::restore(&storage).await?;
        let mut session = UserSession::load_or_create(&storage).await?;
        auth.sync_session(&storage, &mut session).await?;
        social.set_token(auth.token().cloned());

        Ok(Self {
            storage,
            social,
            tmdb,
            auth,
            session,
        })
    }

    /// Run one subcommand, writing its human-readable output to `out`.
    ///
    /// # Errors
    ///
    /// Backend failures surface as their user-facing message, ready to
    /// print as is. Friends and profile commands fail without touching the
    /// network when nobody is signed in.
    pub async fn run<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Login { email, password } => {
                let password = password_or_stdin(password)?;
                let user = self
                    .auth
                    .login(
                        &self.storage,
                        &mut self.social,
                        &mut self.session,
                        &email,
                        &password,
                    )
                    .await
                    .map_err(user_facing)?;
                writeln!(out, "Signed in as {} <{}>", user.name, user.email)?;
            }
            Command::Register {
                name,
                email,
                password,
                confirm,
            } => {
                let password = password_or_stdin(password)?;
                let confirm = confirm.unwrap_or_else(|| password.clone());
                let form = Registration {
                    name: &name,
                    email: &email,
                    password: &password,
                    confirm: &confirm,
                };
                let user = self
                    .auth
                    .register(&self.storage, &mut self.social, &mut self.session, &form)
                    .await
                    .map_err(user_facing)?;
                writeln!(out, "Welcome, {}! You are signed in.", user.name)?;
            }
            Command::Logout => {
                if !self.auth.is_authenticated() {
                    writeln!(out, "Not signed in")?;
                    return Ok(());
                }
                self.auth
                    .logout(&self.storage, &mut self.social, &mut self.session)
                    .await?;
                writeln!(out, "Signed out")?;
            }
            Command::Whoami => match self.auth.user() {
                Some(user) => writeln!(out, "{} <{}> (id {})", user.name, user.email, user.id)?,
                None => writeln!(out, "guest (session {})", self.session.session_id)?,
            },
            Command::Friends(command) => self.friends(command, out).await?,
            Command::Profile(command) => self.profile(command, out).await?,
            Command::Dashboard(args) => self.dashboard(&args, out).await?,
        }
        Ok(())
    }

    fn require_sign_in(&self) -> Result<&str> {
        match self.auth.user() {
            Some(user) if self.auth.is_authenticated() => Ok(&user.id),
            _ => bail!("Not signed in. Run `reelswipe login` first."),
        }
    }

    async fn friends<W: Write>(&mut self, command: FriendsCommand, out: &mut W) -> Result<()> {
        let me = self.require_sign_in()?.to_string();
        let mut state = FriendsState::new();

        match command {
            FriendsCommand::List => {
                state.refresh(&self.social).await;
                if let Some(error) = state.error() {
                    bail!("{error}");
                }
                if state.friends().is_empty() {
                    writeln!(out, "No friends yet")?;
                }
                for connection in state.friends() {
                    let friend = &connection.friend;
                    writeln!(
                        out,
                        "{} {} (@{}) id {}",
                        if friend.is_online { "●" } else { "○" },
                        sanitize_line(&friend.display_name),
                        friend.username,
                        friend.id
                    )?;
                }
            }
            FriendsCommand::Requests => {
                state.refresh(&self.social).await;
                if let Some(error) = state.error() {
                    bail!("{error}");
                }
                let received: Vec<_> = state.received_requests(&me).collect();
                let sent: Vec<_> = state.sent_requests(&me).collect();
                if received.is_empty() && sent.is_empty() {
                    writeln!(out, "No pending requests")?;
                }
                for request in received {
                    writeln!(
                        out,
                        "from @{}  {}  (accept with: reelswipe friends accept {})",
                        request.from_user.username,
                        request.message.as_deref().map(sanitize_line).unwrap_or_default(),
                        request.id
                    )?;
                }
                for request in sent {
                    writeln!(out, "to @{}  pending", request.to_user.username)?;
                }
            }
            FriendsCommand::Add { user_id, message } => {
                let request = state
                    .send_request(&self.social, &user_id, message.as_deref())
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                writeln!(out, "Friend request sent to @{}", request.to_user.username)?;
            }
            FriendsCommand::Accept { request_id } => {
                let connection = state
                    .accept_request(&self.social, &request_id)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                writeln!(out, "You are now friends with @{}", connection.friend.username)?;
            }
            FriendsCommand::Reject { request_id } => {
                state
                    .reject_request(&self.social, &request_id)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                writeln!(out, "Request rejected")?;
            }
            FriendsCommand::Remove { friend_id } => {
                state
                    .remove_friend(&self.social, &friend_id)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                writeln!(out, "Friend removed")?;
            }
        }
        Ok(())
    }

    async fn profile<W: Write>(&mut self, command: ProfileCommand, out: &mut W) -> Result<()> {
        let me = self.require_sign_in()?.to_string();
        let mut state = ProfileState::new();

        match command {
            ProfileCommand::Show { user_id: None } => {
                let profile = state
                    .load(&self.social)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                print_profile(out, profile)?;
            }
            ProfileCommand::Show { user_id: Some(id) } => {
                let profile = self
                    .social
                    .profile(&id)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                print_profile(out, &profile)?;
                if id != me {
                    let mut friends = FriendsState::new();
                    friends.refresh(&self.social).await;
                    // Unknown rather than a wrong answer when the lists failed
                    if friends.error().is_none() {
                        let status = friends.friendship_status(&me, &id);
                        writeln!(out, "Friendship: {}", status.label())?;
                    }
                }
            }
            ProfileCommand::Update {
                display_name,
                bio,
                public,
                genres,
            } => {
                let update = UpdateProfile {
                    display_name,
                    bio,
                    is_public: public,
                    favorite_genres: genres,
                };
                if update.is_empty() {
                    bail!("Nothing to update");
                }
                let profile = state.update(&self.social, &update).await.map_err(|e| match e {
                    social::ProfileError::Remote(e) => anyhow::anyhow!(e.user_message()),
                    other => anyhow::anyhow!(other),
                })?;
                writeln!(out, "Profile updated")?;
                print_profile(out, profile)?;
            }
            ProfileCommand::Search { query, page, size } => {
                let result = social::search_users(&self.social, &query, page, size).await;
                if result.users.is_empty() {
                    writeln!(out, "No users found")?;
                }
                for user in &result.users {
                    writeln!(
                        out,
                        "@{}  {}  id {}",
                        user.username,
                        sanitize_line(&user.display_name),
                        user.id
                    )?;
                }
                if result.total_pages > 1 {
                    writeln!(
                        out,
                        "page {} of {} ({} users)",
                        result.current_page + 1,
                        result.total_pages,
                        result.total_count
                    )?;
                }
            }
            ProfileCommand::Avatar { path } => {
                let url = state
                    .upload_avatar(&self.social, &path)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                writeln!(out, "Avatar uploaded: {url}")?;
            }
        }
        Ok(())
    }

    async fn dashboard<W: Write>(&mut self, args: &DashboardArgs, out: &mut W) -> Result<()> {
        let preferences = Preferences::load(self.storage.clone(), self.session.identifier())
            .await
            .context("Failed to load preferences")?;
        let log = preferences.log();
        if log.is_empty() {
            writeln!(out, "Nothing rated yet")?;
            return Ok(());
        }

        let movies = self.rated_movie_details(log).await;
        let entries = dashboard::build_entries(log, |p| movies.get(&p.movie_id).cloned());
        let filter = args.filter();
        let visible = filter.apply(&entries);

        for (rating, count) in dashboard::rating_counts(&entries) {
            write!(out, "{}: {}  ", rating.badge(), count)?;
        }
        writeln!(out)?;
        for entry in &visible {
            writeln!(
                out,
                "{:<14} {}  ★ {:.1}  {}",
                entry.badge(),
                sanitize_line(entry.title()),
                entry.vote_average(),
                entry.preference.timestamp.format("%Y-%m-%d")
            )?;
        }
        if !filter.is_empty() {
            writeln!(out, "{} of {} shown", visible.len(), entries.len())?;
        }
        Ok(())
    }

    /// Details for every rated movie. The built-in list answers offline;
    /// the rest come from TMDB, and failures are left out.
    async fn rated_movie_details(
        &self,
        log: &crate::preferences::PreferenceLog,
    ) -> HashMap<MovieId, Movie> {
        let mut movies: HashMap<MovieId, Movie> =
            fallback_movies().into_iter().map(|m| (m.id, m)).collect();
        let mut missing: Vec<MovieId> = log
            .preferences
            .iter()
            .map(|p| p.movie_id)
            .filter(|id| !movies.contains_key(id))
            .collect();
        missing.sort();
        missing.dedup();

        let fetched: Vec<_> = futures::stream::iter(missing)
            .map(|id| {
                let tmdb = self.tmdb.clone();
                async move { (id, tmdb.movie(id).await) }
            })
            .buffer_unordered(DETAIL_CONCURRENCY)
            .collect()
            .await;
        for (id, result) in fetched {
            match result {
                Ok(movie) => {
                    movies.insert(id, movie);
                }
                Err(e) => tracing::debug!(movie_id = %id, error = %e, "No details for rated movie"),
            }
        }
        movies
    }
}

fn print_profile<W: Write>(out: &mut W, profile: &social::UserProfile) -> Result<()> {
    writeln!(
        out,
        "{} (@{})",
        sanitize_line(&profile.display_name),
        profile.username
    )?;
    if let Some(bio) = &profile.bio {
        writeln!(out, "{}", sanitize_line(bio))?;
    }
    writeln!(
        out,
        "{} · {} movies · {}",
        joined_label(profile, Utc::now()),
        profile.movie_count,
        if profile.is_public { "public" } else { "private" }
    )?;
    if !profile.favorite_genres.is_empty() {
        writeln!(out, "Favourite genres: {}", profile.favorite_genres.join(", "))?;
    }
    Ok(())
}

fn user_facing(error: AuthError) -> anyhow::Error {
    match error {
        AuthError::Remote(e) => anyhow::anyhow!(e.user_message()),
        other => anyhow::anyhow!(other),
    }
}

fn password_or_stdin(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
