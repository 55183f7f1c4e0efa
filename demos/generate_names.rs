//! Name generation walkthrough.
//!
//! Normalizes caller-supplied names, renders the default and a custom
//! template for each principal type, and shows the length-limit failure.
//!
//! Run with: `cargo run --example generate_names`

use principal_naming::{
    Error, NameGenerator, NameRequest, PrincipalType, Tainted, DEFAULT_USERNAME_TEMPLATE,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Principal Name Generation ===\n");

    let generator = NameGenerator::default();

    println!("--- Scenario 1: Default template per principal type ---");
    for principal_type in PrincipalType::ALL {
        let request = NameRequest::new(
            Tainted::new("token: ci/runner".to_string()),
            Tainted::new("s3 read-only".to_string()),
            principal_type,
        );
        match generator.generate_for_request(&request, DEFAULT_USERNAME_TEMPLATE) {
            Ok(name) => println!("{:<17} {} ({} chars)", principal_type.as_str(), name, name.len()),
            Err(err) => println!("{:<17} error: {}", principal_type.as_str(), err),
        }
    }

    println!("\n--- Scenario 2: Custom template ---");
    let template = "{{ .Type | lowercase }}-{{ .DisplayName | truncate 12 }}-{{ random 6 }}";
    let request = NameRequest::new(
        Tainted::new("Alice Example".to_string()),
        Tainted::new("admin".to_string()),
        PrincipalType::AssumeRole,
    );
    match generator.generate_for_request(&request, template) {
        Ok(name) => println!("{}", name),
        Err(err) => println!("error: {}", err),
    }

    println!("\n--- Scenario 3: Over the STS limit ---");
    let request = NameRequest::new("x".into(), "y".into(), PrincipalType::Sts);
    match generator.generate_for_request(&request, "session-{{ random 40 }}") {
        Err(Error::LengthExceeded(err)) => {
            println!("rejected: {}", err);
            println!("actual length {} > limit {}", err.actual(), err.limit());
        }
        other => println!("unexpected: {:?}", other),
    }

    println!("\n--- Scenario 4: Undefined function ---");
    match generator.generate_for_request(&request, "{{ env \"HOME\" }}") {
        Err(err) => println!("rejected: {}", err),
        Ok(name) => println!("unexpected: {}", name),
    }

    println!("\n=== Example Complete ===");
}
