use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use class5u::app::{App, AppError, Backends, format_lesson};
use class5u::config::{ClientConfig, ConfigError};
use class5u::net::types::{ApiError, Message};
use class5u::state::admin::{AdminCommand, AdminLevel};
use class5u::state::chat::{ChatView, SendOutcome, ViewChange, format_time, view_changes};
use class5u::state::directory::{GENERAL_INFO, Person, TEACHERS, search_students};
use class5u::state::news::STATIC_NEWS;
use class5u::state::schedule::{SchoolDay, minute_of_day_now};
use class5u::state::storage::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("failed to fetch messages")]
    Fetch,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "class5u", about = "5У class group client: chat, schedule, contacts, news")]
struct Cli {
    /// Session file; overrides CLASS5U_STATE_PATH.
    #[arg(long)]
    state_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with an existing account.
    Login(AuthArgs),
    /// Create an account and sign in.
    Register(AuthArgs),
    Logout,
    Whoami,
    Chat(ChatCommand),
    /// Interactive admin console.
    Console,
    /// Lessons for a day (default: today).
    Schedule { day: Option<SchoolDay> },
    /// One lesson with its status and likes.
    Lesson { day: SchoolDay, number: u8 },
    /// Like or unlike a subject.
    Like { subject: String },
    /// Teachers, students (optionally filtered), and general contacts.
    Contacts { query: Option<String> },
    News(NewsCommand),
    Contact(ContactCommand),
    /// Grant admin rights to another user.
    Grant {
        user: String,
        #[arg(long)]
        level: AdminLevel,
        #[arg(long, env = "CLASS5U_GRANT_CODE")]
        code: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AuthArgs {
    username: String,
    #[arg(long, env = "CLASS5U_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct ChatCommand {
    #[command(subcommand)]
    command: ChatSubcommand,
}

#[derive(Subcommand, Debug)]
enum ChatSubcommand {
    List,
    Send {
        text: String,
        /// Post as "Аноним" (admins only).
        #[arg(long)]
        anonymous: bool,
        /// Mark as an admin message (admins only).
        #[arg(long)]
        admin: bool,
    },
    Edit {
        id: i64,
        text: String,
    },
    Delete {
        id: i64,
    },
    /// Follow the chat; lines typed on stdin are sent.
    Watch,
}

#[derive(Args, Debug)]
struct NewsCommand {
    #[command(subcommand)]
    command: NewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NewsSubcommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ContactCommand {
    #[command(subcommand)]
    command: ContactSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContactSubcommand {
    List,
    Create(ContactArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContactArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    /// ученик, админ, or учитель
    #[arg(long)]
    role: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(path) = cli.state_path {
        config.state_path = path;
    }
    let store = Arc::new(FileStore::new(config.state_path.clone()));
    let backends = Backends::http(&config)?;
    let mut app = App::new(config, backends, store);

    match cli.command {
        Command::Login(args) => {
            app.login(&args.username, &args.password).await?;
            print_whoami(&app);
            Ok(())
        }
        Command::Register(args) => {
            app.register(&args.username, &args.password).await?;
            print_whoami(&app);
            Ok(())
        }
        Command::Logout => {
            app.logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            print_whoami(&app);
            Ok(())
        }
        Command::Chat(chat) => run_chat(&mut app, chat).await,
        Command::Console => run_console(&mut app).await,
        Command::Schedule { day } => {
            run_schedule(&app, day);
            Ok(())
        }
        Command::Lesson { day, number } => run_lesson(&app, day, number).await,
        Command::Like { subject } => {
            let likes = app.toggle_like(&subject).await?;
            let mark = if likes.has_liked() { " ♥" } else { "" };
            println!("{}: {}{mark}", likes.subject(), likes.label());
            Ok(())
        }
        Command::Contacts { query } => {
            run_contacts(query.as_deref());
            Ok(())
        }
        Command::News(news) => run_news(&app, news).await,
        Command::Contact(contact) => run_contact(&app, contact).await,
        Command::Grant { user, level, code } => {
            let grant = app.grant_admin(&user, level, code.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&grant)?);
            Ok(())
        }
    }
}

fn print_whoami(app: &App) {
    let session = app.session();
    match session.identity() {
        Some((user_id, username)) => {
            let role = if session.is_admin { " [admin]" } else { "" };
            println!("{username} (id {user_id}){role}");
        }
        None => println!("Not signed in"),
    }
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(app: &mut App, chat: ChatCommand) -> Result<(), CliError> {
    match chat.command {
        ChatSubcommand::List => {
            if !app.chat().refresh().await {
                return Err(CliError::Fetch);
            }
            let username = app.session().username.clone();
            for message in &app.chat().view().messages {
                print_message(message, username.as_deref());
            }
            Ok(())
        }
        ChatSubcommand::Send { text, anonymous, admin } => {
            if anonymous {
                app.apply_admin_command(AdminCommand::Anonymous)?;
            }
            if admin {
                app.apply_admin_command(AdminCommand::AdminChat(true))?;
            }
            report_send(app.send_message(&text).await?);
            Ok(())
        }
        ChatSubcommand::Edit { id, text } => {
            if app.edit_message(id, &text).await? {
                println!("Edited #{id}");
            }
            Ok(())
        }
        ChatSubcommand::Delete { id } => {
            app.delete_message(id).await?;
            println!("Deleted #{id}");
            Ok(())
        }
        ChatSubcommand::Watch => watch_chat(app).await,
    }
}

fn report_send(outcome: SendOutcome) {
    match outcome {
        SendOutcome::Skipped => println!("Nothing to send"),
        SendOutcome::Sent { admin_granted, .. } => {
            println!("Sent");
            if admin_granted {
                println!("Admin rights granted");
            }
        }
    }
}

fn print_message(message: &Message, me: Option<&str>) {
    let time = format_time(&message.created_at).unwrap_or_else(|| "--:--".to_owned());
    let own = if Some(message.username.as_str()) == me { "*" } else { " " };
    let admin = if message.is_admin { " [admin]" } else { "" };
    println!("{own}[{time}] #{} {}{admin}: {}", message.id, message.username, message.message);
}

async fn watch_chat(app: &mut App) -> Result<(), CliError> {
    app.chat_mut().enter().await;
    let mut updates = app.chat().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = Vec::new();
    let mut last_error = None;
    let me = app.session().username.clone();

    print_changes(&app.chat().view(), &mut shown, &mut last_error, me.as_deref());
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                print_changes(&view, &mut shown, &mut last_error, me.as_deref());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Err(e) = app.send_message(&line).await {
                    eprintln!("error: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    app.chat_mut().leave();
    Ok(())
}

/// Print what changed since the last render: appends, edits, and deletes.
fn print_changes(view: &ChatView, shown: &mut Vec<Message>, last_error: &mut Option<String>, me: Option<&str>) {
    for change in view_changes(shown, &view.messages) {
        match change {
            ViewChange::Added(message) => print_message(message, me),
            ViewChange::Edited(message) => {
                print!("(edited) ");
                print_message(message, me);
            }
            ViewChange::Removed(id) => println!("(deleted) #{id}"),
        }
    }
    shown.clone_from(&view.messages);
    if view.error != *last_error {
        if let Some(error) = &view.error {
            eprintln!("error: {error}");
        }
        last_error.clone_from(&view.error);
    }
}

// =============================================================================
// CONSOLE
// =============================================================================

async fn run_console(app: &mut App) -> Result<(), CliError> {
    for line in app.console().lines() {
        println!("{line}");
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(input) = lines.next_line().await? else { break };
        if matches!(input.trim(), "exit" | "quit") {
            break;
        }
        let before = app.console().history().len();
        if app.console_input(&input).await {
            // Skip the echoed input line.
            for reply in app.console().history().iter().skip(before + 1) {
                println!("{reply}");
            }
        }
    }
    Ok(())
}

// =============================================================================
// SCHEDULE
// =============================================================================

fn run_schedule(app: &App, day: Option<SchoolDay>) {
    let today = SchoolDay::today();
    let day = day.or(today).unwrap_or(SchoolDay::Monday);
    let now = minute_of_day_now();
    println!("{day}");
    for lesson in app.schedule().lessons(day) {
        if Some(day) == today {
            println!("  {}  {}", format_lesson(lesson), lesson.status_at(now));
        } else {
            println!("  {}", format_lesson(lesson));
        }
    }
}

async fn run_lesson(app: &App, day: SchoolDay, number: u8) -> Result<(), CliError> {
    let (lesson, status) = app.lesson_status(day, number)?;
    let likes = app.lesson_likes(&lesson.subject).await;
    println!("{} ({day}, урок #{})", lesson.subject, lesson.number);
    println!("Кабинет: {}", lesson.classroom());
    println!("Время: {} – {}", lesson.start_time, lesson.end_time);
    println!("{status}");
    let mark = if likes.has_liked() { " ♥" } else { "" };
    println!("{}{mark}", likes.label());
    Ok(())
}

// =============================================================================
// CONTACTS & NEWS
// =============================================================================

fn print_person(person: &Person) {
    println!("  {}  {}", person.name, person.phone);
}

fn run_contacts(query: Option<&str>) {
    println!("Учителя");
    TEACHERS.iter().for_each(print_person);
    println!("Ученики");
    let students = search_students(query.unwrap_or_default());
    if students.is_empty() {
        println!("  Ничего не найдено");
    }
    students.into_iter().for_each(print_person);
    println!("Общая информация");
    println!("  Email: {}", GENERAL_INFO.email);
    println!("  Телефон: {}", GENERAL_INFO.phone);
    println!("  Чат класса: {}", GENERAL_INFO.group_chat);
}

async fn run_news(app: &App, news: NewsCommand) -> Result<(), CliError> {
    match news.command {
        NewsSubcommand::List => {
            for item in &STATIC_NEWS {
                println!("{}  {}\n  {}", item.date, item.title, item.description);
            }
            match app.list_news().await {
                Ok(items) => {
                    for item in items {
                        println!("#{} {}  {}\n  {}", item.id, item.created_at, item.title, item.content);
                    }
                }
                Err(e) => eprintln!("remote news unavailable: {e}"),
            }
            Ok(())
        }
        NewsSubcommand::Create { title, content } => {
            let item = app.create_news(&title, &content).await?;
            println!("Created news #{}", item.id);
            Ok(())
        }
        NewsSubcommand::Update { id, title, content } => {
            app.update_news(id, &title, &content).await?;
            println!("Updated news #{id}");
            Ok(())
        }
        NewsSubcommand::Delete { id } => {
            app.delete_news(id).await?;
            println!("Deleted news #{id}");
            Ok(())
        }
    }
}

async fn run_contact(app: &App, contact: ContactCommand) -> Result<(), CliError> {
    match contact.command {
        ContactSubcommand::List => {
            for c in app.list_contacts().await? {
                println!("#{} {}  {}  ({})", c.id, c.name, c.phone, c.role.as_str());
            }
            Ok(())
        }
        ContactSubcommand::Create(args) => {
            let created = app.create_contact(&args.name, &args.phone, &args.role).await?;
            println!("Created contact #{}", created.id);
            Ok(())
        }
        ContactSubcommand::Update { id, fields } => {
            app.update_contact(id, &fields.name, &fields.phone, &fields.role).await?;
            println!("Updated contact #{id}");
            Ok(())
        }
        ContactSubcommand::Delete { id } => {
            app.delete_contact(id).await?;
            println!("Deleted contact #{id}");
            Ok(())
        }
    }
}
