pub mod agent;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_support;

use agent::ChatAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Store Type: {}", args.store_type);
    info!("Store URL: {}", args.supabase_url);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!(
        "Chat Model: {}",
        args.chat_model.as_deref().unwrap_or("adapter default")
    );
    info!("-------------------------");

    let agent = Arc::new(ChatAgent::from_args(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent);
    server.run().await?;

    Ok(())
}
