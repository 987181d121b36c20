use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sweatlo::api::{
    Api, ExerciseDetail, NewGoal, NewPost, PageRequest, ProfileSettings, RegisterRequest, RoutineInput,
    UPLOAD_CONTEXT_POST, UPLOAD_CONTEXT_PROFILE,
};
use sweatlo::{ClientConfig, ConfigError, FileStorage, Gateway, GatewayError, NavigationObserver, Navigator, SessionStore, StorageError};
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not logged in; run `sweatlo login` first")]
    NotLoggedIn,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("request failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("routine {0} not found")]
    RoutineNotFound(i64),
    #[error("reading {path} failed: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no home directory found; pass --session-dir or set SWEATLO_SESSION_DIR")]
    NoHomeDir,
}

#[derive(Parser, Debug)]
#[command(name = "sweatlo", about = "sweatlo workout log client")]
struct Cli {
    /// Backend root including the `/api` prefix.
    #[arg(long, env = "SWEATLO_BASE_URL")]
    base_url: Option<String>,

    /// Directory the session file is kept in. Defaults to `~/.sweatlo`.
    #[arg(long, env = "SWEATLO_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SWEATLO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "SWEATLO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the stored identity and the backend profile.
    Whoami,
    /// Show the profile, or update it when any field is given.
    Profile(ProfileArgs),
    Goals(GoalsCommand),
    Post(PostCommand),
    Comment(CommentCommand),
    /// Follow a user, or unfollow if already following.
    Follow {
        user_id: i64,
    },
    Routine(RoutineCommand),
    /// Upload an image and print its hosted URL.
    Upload {
        path: PathBuf,
        #[arg(long, default_value = UPLOAD_CONTEXT_POST)]
        context: String,
        /// Also make the uploaded image the profile avatar.
        #[arg(long, default_value_t = false)]
        set_avatar: bool,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    nickname: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    weight: Option<f64>,
}

impl ProfileArgs {
    fn into_settings(self) -> Option<ProfileSettings> {
        if self.nickname.is_none() && self.bio.is_none() && self.height.is_none() && self.weight.is_none() {
            return None;
        }
        Some(ProfileSettings { nickname: self.nickname, bio: self.bio, height: self.height, weight: self.weight })
    }
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    size: u32,
}

impl PageArgs {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

#[derive(Args, Debug)]
struct GoalsCommand {
    #[command(subcommand)]
    command: Option<GoalsSubcommand>,
}

#[derive(Subcommand, Debug)]
enum GoalsSubcommand {
    List,
    Add {
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        exercise: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PostCommand {
    #[command(subcommand)]
    command: PostSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostSubcommand {
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        memo: String,
        #[arg(long, default_value = "")]
        category: String,
        /// `YYYY-MM-DD`.
        #[arg(long)]
        date: Option<String>,
        /// `HH:MM`.
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        /// `name:weight:reps:sets`, repeatable; empty numbers are left unset.
        #[arg(long = "exercise", value_parser = parse_exercise)]
        exercises: Vec<ExerciseDetail>,
    },
    Show {
        post_id: i64,
    },
    /// List a user's posts; defaults to the logged-in user.
    List {
        #[arg(long)]
        user: Option<i64>,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Args, Debug)]
struct CommentCommand {
    #[command(subcommand)]
    command: CommentSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentSubcommand {
    List {
        post_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Add {
        post_id: i64,
        text: String,
    },
    Delete {
        comment_id: i64,
    },
}

#[derive(Args, Debug)]
struct RoutineCommand {
    #[command(subcommand)]
    command: RoutineSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoutineSubcommand {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        routine_id: i64,
    },
    Update {
        routine_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "exercise", value_parser = parse_exercise)]
        exercises: Vec<ExerciseDetail>,
    },
}

/// Prints a notice when the session ends; a terminal has no route to follow.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "session ended");
        eprintln!("session ended; run `sweatlo login` to continue");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = client_config(cli.base_url.as_deref())?;
    let session_dir = match cli.session_dir {
        Some(dir) => dir,
        None => default_session_dir()?,
    };
    tracing::debug!(base_url = %config.base_url, session_dir = %session_dir.display(), "starting");

    let store = SessionStore::open(FileStorage::new(session_dir));
    let observer = NavigationObserver::new(&store, Arc::new(TerminalNavigator), config.login_route.clone()).spawn();
    let api = Api::new(Gateway::new(&config, store)?);

    let result = run(&api, cli.command).await;

    // Dropping the last store handle closes the event channel, so the observer
    // drains any pending invalidation and exits.
    drop(api);
    if let Err(e) = observer.await {
        tracing::warn!(error = %e, "navigation observer failed");
    }
    result
}

fn client_config(base_url: Option<&str>) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = base_url {
        config.base_url = ClientConfig::with_base_url(base_url).base_url;
    }
    Ok(config)
}

fn default_session_dir() -> Result<PathBuf, CliError> {
    dirs::home_dir()
        .map(|home| home.join(".sweatlo"))
        .ok_or(CliError::NoHomeDir)
}

async fn run(api: &Api, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let user = api.login(&email, &password).await?;
            println!("logged in as {} (id {})", user.nickname, user.id);
            Ok(())
        }
        Command::Register { full_name, email, username, password } => {
            api.register(&RegisterRequest { full_name, email: email.clone(), username, password })
                .await?;
            println!("registered {email}; run `sweatlo login` to sign in");
            Ok(())
        }
        Command::Logout => {
            api.logout()?;
            Ok(())
        }
        Command::Whoami => {
            let Some(user) = api.session().snapshot().user else {
                return Err(CliError::NotLoggedIn);
            };
            println!("{} (id {})", user.nickname, user.id);
            print_json(&api.me().await?)
        }
        Command::Profile(args) => match args.into_settings() {
            Some(settings) => print_json(&api.update_profile(&settings).await?),
            None => print_json(&api.me().await?),
        },
        Command::Goals(goals) => run_goals(api, goals).await,
        Command::Post(post) => run_post(api, post).await,
        Command::Comment(comment) => run_comment(api, comment).await,
        Command::Follow { user_id } => {
            api.toggle_follow(user_id).await?;
            println!("follow toggled for user {user_id}");
            Ok(())
        }
        Command::Routine(routine) => run_routine(api, routine).await,
        Command::Upload { path, context, set_avatar } => {
            let bytes = std::fs::read(&path).map_err(|source| CliError::ReadFile { path: path.clone(), source })?;
            let file_name = path
                .file_name()
                .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
            let context = if set_avatar { UPLOAD_CONTEXT_PROFILE.to_owned() } else { context };
            let uploaded = api.upload_image(&file_name, bytes, &context).await?;
            if set_avatar {
                api.set_profile_image(&uploaded.image_url).await?;
            }
            println!("{}", uploaded.image_url);
            Ok(())
        }
    }
}

async fn run_goals(api: &Api, goals: GoalsCommand) -> Result<(), CliError> {
    match goals.command.unwrap_or(GoalsSubcommand::List) {
        GoalsSubcommand::List => print_json(&api.goals().await?),
        GoalsSubcommand::Add { kind, target, exercise, unit } => {
            let goal = NewGoal { kind, exercise_name: exercise, target_value: target, unit };
            print_json(&api.add_goal(&goal).await?)
        }
    }
}

async fn run_post(api: &Api, post: PostCommand) -> Result<(), CliError> {
    match post.command {
        PostSubcommand::Create { title, memo, category, date, start, end, image_url, exercises } => {
            let post = NewPost {
                title,
                memo,
                category,
                date,
                start_time: start.map(|t| with_seconds(&t)),
                end_time: end.map(|t| with_seconds(&t)),
                image_url,
                details: exercises,
            };
            print_json(&api.create_post(&post).await?)
        }
        PostSubcommand::Show { post_id } => print_json(&api.post(post_id).await?),
        PostSubcommand::List { user, page } => {
            let user_id = match user {
                Some(id) => id,
                None => api
                    .session()
                    .snapshot()
                    .user
                    .map(|u| u.id)
                    .ok_or(CliError::NotLoggedIn)?,
            };
            print_json(&api.posts_by_user(user_id, page.request()).await?)
        }
    }
}

async fn run_comment(api: &Api, comment: CommentCommand) -> Result<(), CliError> {
    match comment.command {
        CommentSubcommand::List { post_id, page } => print_json(&api.comments(post_id, page.request()).await?),
        CommentSubcommand::Add { post_id, text } => print_json(&api.add_comment(post_id, &text).await?),
        CommentSubcommand::Delete { comment_id } => {
            api.delete_comment(comment_id).await?;
            println!("comment {comment_id} deleted");
            Ok(())
        }
    }
}

async fn run_routine(api: &Api, routine: RoutineCommand) -> Result<(), CliError> {
    match routine.command {
        RoutineSubcommand::List { page } => print_json(&api.routines(page.request()).await?),
        RoutineSubcommand::Show { routine_id } => {
            let routine = api
                .routine(routine_id)
                .await?
                .ok_or(CliError::RoutineNotFound(routine_id))?;
            print_json(&routine)
        }
        RoutineSubcommand::Update { routine_id, name, exercises } => {
            api.update_routine(routine_id, &RoutineInput::new(name, exercises))
                .await?;
            println!("routine {routine_id} updated");
            Ok(())
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// `HH:MM` becomes `HH:MM:SS`; anything else is passed through.
fn with_seconds(time: &str) -> String {
    if time.len() == 5 && time.as_bytes().get(2) == Some(&b':') {
        format!("{time}:00")
    } else {
        time.to_owned()
    }
}

/// Parse `name:weight:reps:sets`. Trailing fields may be omitted or empty.
fn parse_exercise(raw: &str) -> Result<ExerciseDetail, String> {
    let mut parts = raw.split(':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("exercise `{raw}` has no name"));
    }
    let mut detail = ExerciseDetail::named(name);
    detail.weight = parse_field(parts.next(), "weight", raw)?;
    detail.reps = parse_field(parts.next(), "reps", raw)?;
    detail.sets = parse_field(parts.next(), "sets", raw)?;
    if parts.next().is_some() {
        return Err(format!("exercise `{raw}` has too many fields"));
    }
    Ok(detail)
}

fn parse_field<T: std::str::FromStr>(part: Option<&str>, field: &str, raw: &str) -> Result<Option<T>, String> {
    match part.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("exercise `{raw}`: invalid {field} `{value}`")),
    }
}
