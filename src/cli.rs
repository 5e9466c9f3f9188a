//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::core::access::Plan;
use crate::core::extract::DocumentKind;
use crate::core::llm::Provider;
use crate::core::prompt::{self, Difficulty};

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  study-buddy questions -f lecture.pdf -n 10 -d hard   Generate 10 hard questions from a PDF
  study-buddy questions -t \"Ohm's law ...\" --quiz      Generate from pasted text, then take the quiz
  study-buddy notes generate -f outline.docx -p grok   Study notes from a course outline
  study-buddy notes export -o thermo.txt               Save the last notes as plain text
  study-buddy quiz                                     Retake the stored question set
  study-buddy redeem ABCD-EFGH-JKLM                    Activate a subscription
  study-buddy status                                   Show plan and free-tier usage
  study-buddy completions bash                         Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn course material into quiz questions and study notes",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Where the course material comes from. Reads stdin when neither is given.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Course file (.txt, .docx or .pdf); '-' reads stdin
    #[arg(short = 'f', long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Course text passed directly
    #[arg(short = 't', long)]
    pub text: Option<String>,

    /// Treat the file as this format instead of guessing from its extension
    #[arg(long, value_enum, requires = "file")]
    pub format: Option<DocumentKind>,
}

/// Provider selection and demo switch shared by the generating commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// AI provider (defaults to STUDY_BUDDY_PROVIDER, then openai)
    #[arg(short = 'p', long, value_enum)]
    pub provider: Option<Provider>,

    /// Use the built-in demo set instead of calling a provider
    #[arg(long)]
    pub demo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a multiple-choice question set from course material
    Questions {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        generate: GenerateArgs,

        /// Number of questions (3, 5, 10, 15 or 20)
        #[arg(short = 'n', long, default_value_t = prompt::DEFAULT_QUESTION_COUNT, value_parser = prompt::parse_question_count)]
        count: u32,

        /// Difficulty level
        #[arg(short = 'd', long, value_enum, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// Start the quiz right after generating
        #[arg(long)]
        quiz: bool,
    },
    /// Generate, show or export study notes
    Notes {
        #[command(subcommand)]
        subcommand: NotesSubcommand,
    },
    /// Take a quiz on the stored question set
    Quiz,
    /// Show subscription status and free-tier usage
    Status,
    /// Redeem an access code to activate a subscription
    Redeem {
        /// Code in the form XXXX-XXXX-XXXX
        code: String,
    },
    /// Issue a new access code for a customer
    IssueCode {
        /// Customer email address
        #[arg(long)]
        email: String,

        /// Plan the code activates
        #[arg(long, value_enum, default_value_t = Plan::Basic)]
        plan: Plan,
    },
    /// Delete stored questions and notes
    Reset {
        /// Also clear usage counters, subscription and access codes
        #[arg(long)]
        all: bool,
    },
    /// Show data paths, provider and API key status
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum NotesSubcommand {
    /// Generate study notes from a course outline
    Generate {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Print the stored study notes
    Show,
    /// Write the stored study notes to a text file
    Export {
        /// Output file
        #[arg(short = 'o', long, default_value = "study_notes.txt")]
        output: PathBuf,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn questions_defaults() {
        let args = Args::try_parse_from(["study-buddy", "questions", "-t", "text"]).unwrap();
        match args.command {
            Commands::Questions {
                input,
                generate,
                count,
                difficulty,
                quiz,
            } => {
                assert_eq!(input.text.as_deref(), Some("text"));
                assert!(generate.provider.is_none());
                assert_eq!(count, 5);
                assert_eq!(difficulty, Difficulty::Medium);
                assert!(!quiz);
            }
            _ => panic!("expected questions"),
        }
    }

    #[test]
    fn questions_rejects_unsupported_count() {
        assert!(Args::try_parse_from(["study-buddy", "questions", "-n", "7"]).is_err());
    }

    #[test]
    fn file_and_text_conflict() {
        assert!(
            Args::try_parse_from(["study-buddy", "notes", "generate", "-f", "a.pdf", "-t", "x"])
                .is_err()
        );
    }

    #[test]
    fn provider_ids() {
        let args =
            Args::try_parse_from(["study-buddy", "notes", "generate", "-p", "openai"]).unwrap();
        match args.command {
            Commands::Notes {
                subcommand: NotesSubcommand::Generate { generate, .. },
            } => assert_eq!(generate.provider, Some(Provider::OpenAi)),
            _ => panic!("expected notes generate"),
        }
    }

    #[test]
    fn log_levels() {
        let parse = |argv: &[&str]| Args::try_parse_from(argv).unwrap().log_level();
        assert_eq!(parse(&["study-buddy", "status"]), "warn");
        assert_eq!(parse(&["study-buddy", "-v", "status"]), "info");
        assert_eq!(parse(&["study-buddy", "status", "-vv"]), "debug");
        assert_eq!(parse(&["study-buddy", "-q", "status"]), "error");
    }
}
