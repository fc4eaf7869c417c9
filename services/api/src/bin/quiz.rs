//! services/api/src/bin/quiz.rs
//!
//! The interactive terminal quiz. Talks to a running `api` server.

use api_lib::{
    adapters::http::HttpProblemRepository,
    config::ClientConfig,
    error::ApiError,
    terminal::{dispatch, is_yes, parse_command, render, Command},
};
use fill_blank_core::quiz::QuizController;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn prompt(text: &str) -> Result<(), ApiError> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = ClientConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Using API at {}", config.api_url);

    let client = reqwest::Client::builder().build()?;
    let repo = Arc::new(HttpProblemRepository::new(client, config.api_url.clone()));
    let mut quiz = QuizController::new(repo);

    println!("{}", render(&quiz));
    quiz.load().await;
    println!("{}", render(&quiz));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        let command = match command {
            Command::Quit => break,
            Command::Delete { .. } => {
                let Some(problem) = quiz.current_problem() else {
                    continue;
                };
                prompt(&format!("Delete \"{}\"? [y/N] ", problem.text))?;
                let answer = lines.next_line().await?.unwrap_or_default();
                Command::Delete {
                    confirmed: is_yes(&answer),
                }
            }
            other => other,
        };

        if let Some(message) = dispatch(&mut quiz, command).await {
            println!("{}", message);
        }
        println!("{}", render(&quiz));
    }

    Ok(())
}
