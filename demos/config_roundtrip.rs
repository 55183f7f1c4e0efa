//! Backend configuration round trip.
//!
//! Writes configuration through the `config/root` request handler, reads it
//! back, and generates a name from the stored template.
//!
//! Run with: `cargo run --example config_roundtrip`

use principal_naming::{
    ConfigPath, InMemoryStorage, NameGenerator, NameRequest, PrincipalType, Response, Tainted,
};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Config Round Trip ===\n");

    let storage = InMemoryStorage::new();
    let path = ConfigPath::default();

    println!("--- Scenario 1: Rejected write ---");
    let body = json!({ "connection_uri": "https://iam.example.com", "username": "root" });
    let data = body.as_object().cloned().unwrap_or_default();
    match path.handle_write(&storage, &data) {
        Ok(Some(Response::Error(err))) => println!("request error: {}", err),
        other => println!("unexpected: {:?}", other),
    }

    println!("\n--- Scenario 2: Write with the default template ---");
    let body = json!({
        "connection_uri": "https://iam.example.com",
        "username": "root",
        "password": "hunter2",
    });
    let data = body.as_object().cloned().unwrap_or_default();
    match path.handle_write(&storage, &data) {
        Ok(None) => println!("stored"),
        other => println!("unexpected: {:?}", other),
    }

    match path.store().read(&storage) {
        Ok(config) => {
            println!("config: {:?}", config);
            println!("\nNotice: the password is shown as [REDACTED]");
        }
        Err(err) => println!("read failed: {}", err),
    }

    println!("\n--- Scenario 3: Read response ---");
    if let Ok(Some(Response::Data(data))) = path.handle_read(&storage) {
        for (key, value) in &data {
            println!("{key} = {value}");
        }
    }

    println!("\n--- Scenario 4: Generate from stored config ---");
    let request = NameRequest::new(
        Tainted::new("deploy bot".to_string()),
        Tainted::new("ecr-push".to_string()),
        PrincipalType::IamUser,
    );
    match NameGenerator::default().generate_for_config(&storage, &request) {
        Ok(name) => println!("generated: {}", name),
        Err(err) => println!("error: {}", err),
    }

    println!("\n=== Example Complete ===");
}
