//! # Study Buddy - course material to quizzes and study notes
//!
//! Entry point: loads `.env`, parses arguments, initializes logging and
//! dispatches to the command implementations in [`run`] and [`core::cli`].

mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use crate::cli::{Args, Commands, NotesSubcommand};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    if let Some(path) = core::paths::env_file()
        && path.exists()
    {
        dotenv::from_path(&path).ok();
    }

    let args = Args::parse();
    run::init_logger(&args);

    match &args.command {
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(*shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
        }
        Commands::Config => core::cli::run_config(),
        Commands::Questions {
            input,
            generate,
            count,
            difficulty,
            quiz,
        } => {
            let store = run::open_store();
            run::run_questions(&store, input, generate, *count, *difficulty, *quiz).await?;
        }
        Commands::Notes { subcommand } => {
            let store = run::open_store();
            match subcommand {
                NotesSubcommand::Generate { input, generate } => {
                    run::run_notes_generate(&store, input, generate).await?
                }
                NotesSubcommand::Show => core::cli::run_notes_show(&store),
                NotesSubcommand::Export { output } => core::cli::run_notes_export(&store, output),
            }
        }
        Commands::Quiz => core::cli::run_quiz(&run::open_store()),
        Commands::Status => core::cli::run_status(&run::open_store()),
        Commands::Redeem { code } => core::cli::run_redeem(&run::open_store(), code),
        Commands::IssueCode { email, plan } => {
            core::cli::run_issue_code(&run::open_store(), email, *plan)
        }
        Commands::Reset { all } => core::cli::run_reset(&run::open_store(), *all),
    }
    Ok(())
}
