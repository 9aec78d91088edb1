use anyhow::Result;
use tokio::io::BufReader;
use tracing::{error, info};

use usercrud::app::user::{User, UserRepository};
use usercrud::app::{Menu, Terminal};
use usercrud::config::{self, Config};
use usercrud::infrastructure::{DatabaseManager, Logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    Logger::init(&config.logging)?;

    println!("\nInitializing");
    println!("--------------------------------------");

    let db = connect(&config).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;

    let users = UserRepository::new(db.get_pool().clone());
    let terminal = Terminal::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let result = Menu::new(terminal, users).run().await;

    db.close().await;
    info!("Session finished");
    result?;
    Ok(())
}

async fn connect(config: &Config) -> usercrud::CoreResult<DatabaseManager> {
    let db = DatabaseManager::new(&config.database)?;
    db.authenticate().await?;
    db.sync::<User>(config.database.sync).await?;
    Ok(db)
}
