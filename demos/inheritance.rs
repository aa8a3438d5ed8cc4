//! Example demonstrating declaration inheritance and the frozen policy

use typedenv::EnvLoader;

#[derive(Debug, EnvLoader)]
#[env(frozen = false)]
struct BaseConfig {
    pub log_level: Option<String>,
}

#[derive(Debug, EnvLoader)]
#[env(extends = BaseConfig)]
struct ServiceConfig {
    // Redeclared: required here, optional in the parent
    pub log_level: String,

    #[env(default = 30)]
    pub timeout_secs: u32,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("LOG_LEVEL", "debug");

    let base = BaseConfig::load()?;
    let service = ServiceConfig::load()?;

    // The parent is mutable, the child is frozen by default
    base.set("LOG_LEVEL", "trace")?;
    if let Err(e) = service.set("LOG_LEVEL", "trace") {
        println!("Rejected: {e}");
    }

    println!("Base log level: {:?}", base.get::<String>("LOG_LEVEL"));
    println!("Service: {:?}", ServiceConfig::from_env()?);

    Ok(())
}
