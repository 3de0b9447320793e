//! CLI probe for `typed_expando_core`.
//!
//! # Responsibility
//! - Print the core version.
//! - Build an expando from `name:type[=value]` arguments and print its
//!   descriptor table, so core wiring can be checked without a host program.
//!
//! Exits with status 1 on the first rejected declaration or value.

use std::process::ExitCode;
use typed_expando_core::{core_version, PropertySchema, TypedExpando};

fn main() -> ExitCode {
    println!("typed_expando_core version={}", core_version());

    match run(std::env::args().skip(1)) {
        Ok(expando) => {
            for descriptor in expando.descriptors() {
                let value = descriptor
                    .get_value(&expando)
                    .map_or_else(|| "<unreadable>".to_string(), |value| value.to_string());
                let access = if descriptor.read_only { "ro" } else { "rw" };
                println!(
                    "{} : {} [{}] = {}",
                    descriptor.name, descriptor.property_type, access, value
                );
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: impl Iterator<Item = String>) -> Result<TypedExpando, String> {
    let mut expando = TypedExpando::new();
    for arg in args {
        let (declaration, raw_value) = match arg.split_once('=') {
            Some((declaration, raw_value)) => (declaration, Some(raw_value)),
            None => (arg.as_str(), None),
        };
        let declaration =
            PropertySchema::parse_declaration(declaration).map_err(|err| err.to_string())?;
        expando
            .add_property(declaration.name.as_str(), declaration.property_type.clone())
            .map_err(|err| err.to_string())?;

        if let Some(raw_value) = raw_value {
            let value = declaration
                .property_type
                .parse_value(raw_value)
                .map_err(|err| err.to_string())?;
            expando
                .set(&declaration.name, value)
                .map_err(|err| err.to_string())?;
        }
    }
    Ok(expando)
}
