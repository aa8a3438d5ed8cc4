//! Example demonstrating per-type and inline converters

use std::collections::HashMap;
use std::convert::Infallible;

use typedenv::EnvLoader;

// Registered for the whole type, keyed by its return type (list[integer])
fn comma_separated_ints(value: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    value.split(',').map(|x| x.trim().parse()).collect()
}

// JSON object into a map
fn json_map(value: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    serde_json::from_str(value)
}

// Inline converter: used for one field only, ahead of any type converter
fn trailing_slash(value: &str) -> Result<String, Infallible> {
    Ok(format!("{}/", value.trim_end_matches('/')))
}

#[derive(Debug, EnvLoader)]
#[env(converter = comma_separated_ints, converter = json_map)]
struct Config {
    pub shard_ids: Vec<i64>,

    pub labels: HashMap<String, String>,

    #[env(converter = trailing_slash)]
    pub base_url: String,

    pub app_name: String,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("SHARD_IDS", "9, 3, 6");
    std::env::set_var("LABELS", r#"{"team": "platform", "tier": "1"}"#);
    std::env::set_var("BASE_URL", "https://example.com/api");
    std::env::set_var("APP_NAME", "my-app");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Shards: {:?}", config.shard_ids);
    println!("  Labels: {:?}", config.labels);
    println!("  Base URL: {}", config.base_url);
    println!("  App Name: {}", config.app_name);

    Ok(())
}
