mod commands;

use clap::{Parser, Subcommand};
use commands::{AskArgs, ChatArgs, ConfigArgs, PptArgs, QuizArgs};
use decimind::config::Config;
use decimind::providers::GroqProvider;

#[derive(Parser)]
#[command(name = "decimind")]
#[command(version = "0.1.0")]
#[command(about = "DeciMind is an AI chat assistant with study, quiz and presentation modes")]
struct DecimindArgs {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Start or resume an interactive chat conversation
	Chat(ChatArgs),

	/// Ask a one-shot question, optionally with file attachments
	Ask(AskArgs),

	/// Generate a multiple choice quiz on a topic
	Quiz(QuizArgs),

	/// Generate a slide deck on a topic
	Ppt(PptArgs),

	/// Show or initialize the configuration
	Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
	let args = DecimindArgs::parse();

	// Load configuration and make it available to the logging macros
	let config = Config::load()?;
	decimind::config::set_thread_config(&config);

	match &args.command {
		Commands::Chat(chat_args) => commands::chat::run(chat_args, &config).await?,
		Commands::Ask(ask_args) => commands::ask::run(ask_args, &config).await?,
		Commands::Quiz(quiz_args) => {
			let provider = GroqProvider::new(&config)?;
			commands::generate::run_quiz(
				&provider,
				&config,
				&quiz_args.topic,
				quiz_args.count,
				&quiz_args.difficulty,
			)
			.await?
		}
		Commands::Ppt(ppt_args) => {
			let provider = GroqProvider::new(&config)?;
			commands::generate::run_ppt(&provider, &config, &ppt_args.topic).await?
		}
		Commands::Config(config_args) => commands::config::run(config_args, &config)?,
	}

	Ok(())
}
