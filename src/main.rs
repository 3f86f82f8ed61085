mod catalog;
mod cli;
mod config;
mod conversation;
mod filter;
mod format;
mod llm;
mod logging;
mod selection;
mod tui;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use conversation::{routine_prompt, Conversation, EMPTY_SELECTION_NOTICE};
use llm::{ChatClient, RequestKind};
use selection::SelectionSet;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env_and_cli(&cli);
    logging::init_tracing(&config.log_file)?;

    match cli.command {
        Some(command) => match command {
            Commands::Ask { message } => {
                let client = config.chat_client();
                let mut conversation = Conversation::new();
                conversation.push_user(message.join(" "));
                print_reply(&client, &conversation, RequestKind::FollowUp).await;
            }
            Commands::Products { category, search } => {
                let catalog = catalog::Catalog::load(&config.catalog).await;
                for product in filter::apply(catalog.products(), &category, &search) {
                    println!("{} | {} | {}", product.name, product.brand, product.category);
                }
            }
            Commands::Format { file, json } => {
                let text = match file {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                    None => {
                        let mut text = String::new();
                        std::io::stdin().read_to_string(&mut text)?;
                        text
                    }
                };
                let blocks = format::format(&text);
                if json {
                    println!("{}", serde_json::to_string_pretty(&blocks)?);
                } else {
                    println!("{}", tui::blocks_to_text(&blocks));
                }
            }
            Commands::Routine { products } => {
                let catalog = catalog::Catalog::load(&config.catalog).await;
                let mut selection = SelectionSet::new();
                for name in &products {
                    match catalog.find(name) {
                        Some(product) => {
                            selection.toggle(product);
                        }
                        None => eprintln!("Unknown product: {}", name),
                    }
                }

                let Some(prompt) = routine_prompt(&selection) else {
                    println!("{}", EMPTY_SELECTION_NOTICE);
                    return Ok(());
                };

                let client = config.chat_client();
                let mut conversation = Conversation::new();
                conversation.push_user(prompt);
                print_reply(&client, &conversation, RequestKind::Routine).await;
            }
        },
        None => {
            let catalog = catalog::Catalog::load(&config.catalog).await;
            if catalog.is_empty() {
                warn!(source = %config.catalog, "Starting with an empty catalog");
            }
            let client = config.chat_client();
            if !client.is_configured() {
                warn!("OPENAI_API_KEY is not set; chat is disabled");
            }
            tui::run(catalog, Arc::new(client)).await?;
        }
    }

    Ok(())
}

/// Send one turn and print the formatted reply, or the failure notice
async fn print_reply(client: &dyn ChatClient, conversation: &Conversation, kind: RequestKind) {
    match client.complete(conversation.messages(), kind).await {
        Ok(reply) => println!("{}", tui::blocks_to_text(&format::format(&reply))),
        Err(err) => eprintln!("{}", err),
    }
}
