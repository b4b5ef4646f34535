//! tabletalk - ask natural-language questions about a CSV dataset.

mod cli;
mod logging;

use std::io::{self, BufRead, Write};

use cli::Cli;
use tabletalk::assistant::Assistant;
use tabletalk::config::Config;
use tabletalk::error::Result;
use tabletalk::pipeline::PipelineState;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();

    // CLI arguments take precedence over config file and environment.
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = Some(dataset.clone());
    }
    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }

    let assistant = Assistant::new(&config).await?;

    println!(
        "Loaded {} rows, columns: {}",
        assistant.schema().row_count,
        assistant.schema().format_columns()
    );

    if let Some(question) = &cli.question {
        let state = assistant.ask_question(question).await;
        print_state(&state, cli.show_sql);
        return Ok(());
    }

    repl(&assistant, cli.show_sql).await
}

/// Reads questions from stdin until EOF or an exit command.
async fn repl(assistant: &Assistant, show_sql: bool) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("? ");
        io::stdout().flush().ok();

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line).unwrap_or(0);
        if bytes == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        let state = assistant.ask_question(question).await;
        print_state(&state, show_sql);
    }

    Ok(())
}

fn print_state(state: &PipelineState, show_sql: bool) {
    if show_sql && !state.sql_query.is_empty() {
        println!("sql: {}", state.sql_query);
    }
    println!("{}", state.final_answer);
}
