use principal_naming::{
    generate_username, normalize_display_name, read_config, write_config, BackendConfig,
    ConfigPath, Error, InMemoryStorage, NameGenerator, NameRequest, NamingDefaults, PrincipalType,
    Secret, Storage, Tainted, TemplateContext, DEFAULT_USERNAME_TEMPLATE,
};
use regex::Regex;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn normalize_example() {
    assert_eq!(
        normalize_display_name("^#$test name\nshould be normalized)(*"),
        "___test_name_should_be_normalized___"
    );
}

#[test]
fn default_template_iam_user() {
    init_tracing();
    let name =
        generate_username("name1", "policy1", "iam_user", DEFAULT_USERNAME_TEMPLATE).unwrap();

    let re = Regex::new(r"^vault-name1-policy1-[0-9]+-[a-zA-Z0-9]+").unwrap();
    assert!(re.is_match(&name), "unexpected name {name}");
    assert!(name.len() <= 64);
}

#[test]
fn default_template_assume_role() {
    let name = generate_username("name1", "policy1", "assume_role", "").unwrap();
    assert!(name.starts_with("vault-name1-policy1-"));
    assert!(name.len() <= 64);
}

#[test]
fn default_template_sts() {
    init_tracing();
    let name = generate_username("name1", "policy1", "sts", DEFAULT_USERNAME_TEMPLATE).unwrap();

    let re = Regex::new(r"^vault-[0-9]+-[a-zA-Z0-9]+").unwrap();
    assert!(re.is_match(&name), "unexpected name {name}");
    assert!(name.len() <= 32);
}

#[test]
fn federation_token_uses_sts_limit() {
    let name = generate_username("name1", "policy1", "federation_token", "").unwrap();
    assert!(name.len() <= 32);
    assert!(!name.contains("name1"));
}

#[test]
fn too_long_iam_name() {
    init_tracing();
    let template = "{{ .DisplayName }}-{{ .PolicyName }}-{{ unix_time }}-{{ random 40 }}";
    let err = generate_username("name1", "policy1", "iam_user", template).unwrap_err();

    assert!(matches!(err, Error::LengthExceeded(_)));
    assert!(err
        .to_string()
        .contains("IAM username length limits of 64 chars"));
}

#[test]
fn too_long_sts_name() {
    let template = "{{ .DisplayName }}-{{ .PolicyName }}-{{ random 20 }}";
    let err = generate_username("name1", "policy1", "sts", template).unwrap_err();

    assert_eq!(
        err.to_string(),
        "the username generated by the template exceeds the STS username length limits of 32 chars"
    );
}

#[test]
fn undefined_symbols_are_template_errors() {
    for template in ["{{ .Missing }}", "{{ exec \"ls\" }}", "{{ if }}"] {
        let err = generate_username("n", "p", "iam_user", template).unwrap_err();
        assert!(matches!(err, Error::Template(_)), "{template}: {err}");
    }
}

#[test]
fn unknown_principal_type() {
    let err = generate_username("n", "p", "root", "").unwrap_err();
    assert!(matches!(err, Error::UnknownPrincipalType(_)));
    assert_eq!(err.to_string(), "unknown principal type 'root'");
}

#[test]
fn config_default_template_round_trip() {
    let storage = InMemoryStorage::new();
    write_config(&storage, BackendConfig::new("test_uri", "guest", "guest", "")).unwrap();

    let config = read_config(&storage).unwrap();
    assert_eq!(config.username_template, DEFAULT_USERNAME_TEMPLATE);
}

#[test]
fn config_custom_template_round_trip() {
    let storage = InMemoryStorage::new();
    let template = "foo-{{.DisplayName}}";
    write_config(&storage, BackendConfig::new("test_uri", "guest", "guest", template)).unwrap();

    assert_eq!(read_config(&storage).unwrap().username_template, template);
}

#[test]
fn read_before_any_write_is_not_found() {
    let storage = InMemoryStorage::new();
    assert!(read_config(&storage).unwrap_err().is_not_found());
}

#[test]
fn request_to_name_through_stored_config() {
    init_tracing();
    let storage = InMemoryStorage::new();
    let path = ConfigPath::default();

    let body = json!({
        "connection_uri": "test_uri",
        "username": "guest",
        "password": "guest",
        "username_template": "svc-{{ .DisplayName }}-{{ .PolicyName }}",
    });
    let resp = path
        .handle_write(&storage, body.as_object().unwrap())
        .unwrap();
    assert!(resp.is_none());

    let request = NameRequest::new(
        Tainted::new("ci runner#7".to_string()),
        Tainted::new("deploy".to_string()),
        PrincipalType::AssumeRole,
    );
    let name = NameGenerator::default()
        .generate_for_config(&storage, &request)
        .unwrap();
    assert_eq!(name, "svc-ci_runner_7-deploy");
}

#[test]
fn generate_for_config_without_config_uses_injected_default() {
    let storage = InMemoryStorage::new();
    let generator = NameGenerator::new(NamingDefaults::new("fallback-{{ .Type }}"));
    let request = NameRequest::new("x".into(), "y".into(), PrincipalType::Sts);

    assert_eq!(
        generator.generate_for_config(&storage, &request).unwrap(),
        "fallback-STS"
    );
}

#[test]
fn shared_storage_across_threads() {
    let storage = std::sync::Arc::new(InMemoryStorage::new());
    write_config(&storage, BackendConfig::new("u", "g", "g", "")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let storage = storage.clone();
            std::thread::spawn(move || {
                let request = NameRequest::new(
                    Tainted::new(format!("user{i}")),
                    Tainted::new("policy".to_string()),
                    PrincipalType::IamUser,
                );
                NameGenerator::default()
                    .generate_for_config(&storage, &request)
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let name = handle.join().unwrap();
        assert!(name.starts_with(&format!("vault-user{i}-policy-")));
    }
    assert_eq!(storage.keys(), vec!["config/root".to_string()]);
}

#[test]
fn pinned_clock_makes_unix_time_deterministic() {
    let now = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let ctx = TemplateContext::build("n", "p", "iam_user").unwrap().at(now);
    let template = principal_naming::template::Template::parse("t-{{ unix_time }}").unwrap();

    assert_eq!(
        NameGenerator::default().render(&template, &ctx).unwrap(),
        "t-1700000000"
    );
}

#[test]
fn secret_is_fully_redacted() {
    let config = BackendConfig::new("u", "guest", "sk-secret123", "");
    assert_eq!(format!("{:?}", config.password), "[REDACTED]");
    assert_eq!(format!("{}", config.password), "[REDACTED]");
    assert!(!format!("{:?}", config).contains("sk-secret"));

    let secret = Secret::new("x".to_string());
    assert_eq!(secret.expose_secret(), "x");
}

#[test]
fn storage_is_object_safe() {
    let storage: Box<dyn Storage> = Box::new(InMemoryStorage::new());
    write_config(storage.as_ref(), BackendConfig::new("u", "g", "g", "")).unwrap();
    assert!(read_config(storage.as_ref()).is_ok());
}
