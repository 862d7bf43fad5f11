use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, RegisterUserCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "monely_admin")]
#[command(about = "Admin utilities for Monely (bootstrap users, repair balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./monely.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallets(Wallets),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user; the password is read twice from the terminal.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    currency: Option<String>,
    /// Grant staff and superuser flags.
    #[arg(long)]
    superuser: bool,
}

#[derive(Args, Debug)]
struct Wallets {
    #[command(subcommand)]
    command: WalletsCommand,
}

#[derive(Subcommand, Debug)]
enum WalletsCommand {
    /// Rebuild a user's cached wallet balances from their transactions.
    Recompute(RecomputeArgs),
}

#[derive(Args, Debug)]
struct RecomputeArgs {
    #[arg(long)]
    email: String,
}

/// What a key press did to the masked input line.
#[derive(Debug, PartialEq)]
enum Keystroke {
    Typed,
    Erased,
    Ignored,
    Submit,
    Abort,
}

/// Password being typed; only the key handling, no terminal I/O.
#[derive(Default)]
struct PasswordInput {
    secret: String,
}

impl PasswordInput {
    fn press(&mut self, key: KeyEvent) -> Keystroke {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => Keystroke::Submit,
            KeyCode::Char('c') if ctrl => Keystroke::Abort,
            KeyCode::Char(ch) if !ctrl => {
                self.secret.push(ch);
                Keystroke::Typed
            }
            KeyCode::Backspace if self.secret.pop().is_some() => Keystroke::Erased,
            _ => Keystroke::Ignored,
        }
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    terminal::enable_raw_mode()?;
    let read = read_masked(prompt);
    terminal::disable_raw_mode()?;
    read
}

fn read_masked(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut input = PasswordInput::default();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match input.press(key) {
            Keystroke::Typed => execute!(out, Print("*"))?,
            Keystroke::Erased => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?
            }
            Keystroke::Ignored => {}
            Keystroke::Submit => {
                execute!(out, Print("\r\n"))?;
                return Ok(input.secret);
            }
            Keystroke::Abort => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
        }
        out.flush()?;
    }
}

fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    execute!(
        std::io::stderr(),
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads a non-empty password and its confirmation, up to three attempts.
fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        if password.is_empty() {
            notice("Password must not be empty.")?;
            continue;
        }

        if prompt_password("Confirm password: ")? == password {
            return Ok(password);
        }
        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if engine.user_by_email(&args.email).await?.is_some() {
                eprintln!("user already exists: {}", args.email);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;
            let mut cmd = RegisterUserCmd::new(&args.email, &args.username, &args.name, password);
            if let Some(currency) = args.currency {
                cmd = cmd.currency(currency);
            }
            if args.superuser {
                cmd = cmd.superuser();
            }
            let user = engine.register_user(cmd).await?;

            let role = if user.is_superuser { "superuser" } else { "user" };
            println!("created {role}: {} ({})", user.email, user.id);
        }
        Command::Wallets(Wallets {
            command: WalletsCommand::Recompute(args),
        }) => {
            let Some(user) = engine.user_by_email(&args.email).await? else {
                eprintln!("user not found: {}", args.email);
                std::process::exit(1);
            };

            let wallets = engine.recompute_balances(user.id).await?;
            for wallet in &wallets {
                println!(
                    "{}\t{}\t{} {}",
                    wallet.id, wallet.name, wallet.balance_minor, wallet.currency
                );
            }
            println!("recomputed {} wallet(s)", wallets.len());
        }
    }

    Ok(())
}
