//! Basic usage example

use typedenv::EnvLoader;

#[derive(Debug, EnvLoader)]
struct Config {
    // Required field: loaded from DATABASE_URL environment variable
    pub database_url: String,

    // With default value
    #[env(default = "127.0.0.1:8080".to_string())]
    pub server_addr: String,

    // Numeric type
    #[env(default = 4)]
    pub num_workers: u16,

    // Boolean type: true/1/false/0, any case
    #[env(default = false)]
    pub debug_mode: bool,

    // Nullable: None when API_KEY is not set
    pub api_key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");
    std::env::set_var("DEBUG_MODE", "TRUE");

    // Load configuration
    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Workers: {}", config.num_workers);
    println!("  Debug Mode: {}", config.debug_mode);
    println!("  API Key: {:?}", config.api_key);

    Ok(())
}
