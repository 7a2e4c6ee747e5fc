//! CLI entry point.
//!
//! # Responsibility
//! - Without a database path: print a deterministic `reviewbook_core` linkage probe.
//! - With a database path: drive the restaurant controller from stdin, one
//!   command per line (`help` lists them).

use clap::{Parser, Subcommand};
use reviewbook_core::{
    default_log_level, init_logging, CoreConfig, RestaurantService, ServiceError,
    SqlitePersistence, SystemClock, DEFAULT_TIME_LIMIT_MINUTES,
};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

type Service = RestaurantService<SqlitePersistence, SystemClock>;

#[derive(Parser)]
#[command(name = "reviewbook")]
#[command(about = "Restaurant review notebook backed by SQLite")]
#[command(version)]
struct Cli {
    /// SQLite file holding the restaurant list; omit to run the linkage probe only
    db_path: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "REVIEWBOOK_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long)]
    log_level: Option<String>,

    /// Minutes during which a new review stays editable
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MINUTES)]
    edit_window_minutes: u32,
}

/// One stdin line; the first word names the command.
#[derive(Parser)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print restaurants, review edit flags and open forms
    List,
    /// Add a restaurant
    Add {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Toggle rename mode for a restaurant
    Edit { restaurant: usize },
    /// Submit the restaurant form (adds when no restaurant is being renamed)
    Title {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Open or close the review form of a restaurant
    Review { restaurant: usize },
    /// Target an existing review for editing
    Select { restaurant: usize, review: usize },
    /// Submit the open review form
    Text {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Close both forms
    Cancel,
    /// Lock reviews whose edit window has closed
    Tick,
    /// Leave the driver
    #[command(alias = "exit")]
    Quit,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("reviewbook_core ping={}", reviewbook_core::ping());
    println!("reviewbook_core version={}", reviewbook_core::core_version());

    let Some(db_path) = cli.db_path else {
        return ExitCode::SUCCESS;
    };

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = CoreConfig {
        edit_time_limit_minutes: cli.edit_window_minutes,
        ..CoreConfig::default()
    };
    let service = SqlitePersistence::open(&db_path, config.document_name.as_str())
        .map_err(ServiceError::from)
        .and_then(|persistence| RestaurantService::open(persistence, SystemClock, &config));
    let mut service = match service {
        Ok(service) => service,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("stdin read failed: {err}");
                return ExitCode::FAILURE;
            }
        };
        match run_line(&mut service, &line) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(message) => println!("{}", message.trim_end()),
        }
    }
    ExitCode::SUCCESS
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn run_line(service: &mut Service, line: &str) -> Result<Flow, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Flow::Continue);
    }
    let parsed = Line::try_parse_from(words).map_err(|err| err.to_string())?;
    run_command(service, parsed.command).map_err(|err| format!("error: {err}"))
}

fn run_command(service: &mut Service, command: Command) -> Result<Flow, ServiceError> {
    match command {
        Command::List => print_list(service),
        Command::Add { title } => {
            service.begin_add_restaurant();
            service.submit_restaurant(&title.join(" "))?;
        }
        Command::Edit { restaurant } => service.toggle_edit_restaurant(restaurant)?,
        Command::Title { title } => service.submit_restaurant(&title.join(" "))?,
        Command::Review { restaurant } => service.toggle_add_review(restaurant)?,
        Command::Select { restaurant, review } => {
            service.select_review_to_edit(restaurant, review)?
        }
        Command::Text { text } => service.submit_review(&text.join(" "))?,
        Command::Cancel => {
            service.cancel_review();
            service.cancel_restaurant();
        }
        Command::Tick => {
            for id in service.tick() {
                println!("locked {id}");
            }
        }
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn print_list(service: &Service) {
    for (index, restaurant) in service.list().restaurants().iter().enumerate() {
        println!("[{index}] {}", restaurant.title);
        for (review_index, review) in restaurant.reviews.iter().enumerate() {
            let editable = service
                .is_review_editable(index, review_index)
                .unwrap_or(false);
            let marker = if editable { "editable" } else { "locked" };
            println!("    ({review_index}) {} [{marker}]", review.text);
        }
    }
    println!("session {:?}", service.session());
}
