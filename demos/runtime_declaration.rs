//! Example declaring a configuration type at runtime, without the derive macro

use typedenv::{Converter, Declaration, EnvLoader, Metadata, TypeExpr, Value};

struct WorkerConfig;

impl EnvLoader for WorkerConfig {
    fn declaration() -> Declaration {
        // Accepts either a port number or a unix socket path
        let port_or_socket = Converter::with_target(
            TypeExpr::union([TypeExpr::Integer, TypeExpr::Text]),
            |value: &str| {
                Ok::<_, std::convert::Infallible>(match value.parse::<i64>() {
                    Ok(port) => Value::Integer(port),
                    Err(_) => Value::from(value),
                })
            },
        );

        Declaration::new()
            .field("NUM_WORKERS", TypeExpr::Integer)
            .field_with_default("RATIO", TypeExpr::Float, 0.5)
            .field("QUEUE", TypeExpr::optional(TypeExpr::Text))
            .field(
                "LISTEN",
                TypeExpr::annotated(
                    TypeExpr::union([TypeExpr::Integer, TypeExpr::Text]),
                    [Metadata::Converter(port_or_socket)],
                ),
            )
            .attribute("started_by", "demo")
    }
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("NUM_WORKERS", "4");
    std::env::set_var("LISTEN", "/run/worker.sock");

    let config = WorkerConfig::load()?;
    for (name, value) in config.values() {
        println!("  {name} = {value:?}");
    }

    Ok(())
}
