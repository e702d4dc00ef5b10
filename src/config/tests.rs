use std::time::Duration;

use super::*;

fn settings_from(raw: RawSettings) -> Result<Settings, LoadError> {
    Settings::from_raw(raw)
}

#[test]
fn defaults_resolve_to_localhost_and_info() {
    let settings = settings_from(RawSettings::default()).expect("settings");
    assert_eq!(settings.server.listen_addr.port(), 5000);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.logging.format, LogFormat::Compact);
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert!(settings.auth.admin_emails.is_empty());
    assert_eq!(
        settings.auth.session_ttl,
        Some(Duration::from_secs(7 * 24 * 3600))
    );
}

#[test]
fn invalid_log_level_is_rejected() {
    let raw = RawSettings {
        logging: RawLoggingSettings {
            level: Some("chatty".to_string()),
            json: None,
        },
        ..RawSettings::default()
    };
    let err = settings_from(raw).expect_err("should fail");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn admin_emails_split_trim_and_lowercase() {
    let raw = RawSettings {
        auth: RawAuthSettings {
            admin_emails: Some(" Ops@Example.com, ,root@example.com ".to_string()),
            session_ttl_hours: None,
        },
        ..RawSettings::default()
    };
    let settings = settings_from(raw).expect("settings");
    assert_eq!(
        settings.auth.admin_emails,
        vec!["ops@example.com".to_string(), "root@example.com".to_string()]
    );
}

#[test]
fn zero_session_ttl_disables_expiry() {
    let raw = RawSettings {
        auth: RawAuthSettings {
            admin_emails: None,
            session_ttl_hours: Some(0),
        },
        ..RawSettings::default()
    };
    let settings = settings_from(raw).expect("settings");
    assert!(settings.auth.session_ttl.is_none());
}

#[test]
fn zero_pool_size_is_rejected() {
    let raw = RawSettings {
        database: RawDatabaseSettings {
            url: None,
            max_connections: Some(0),
        },
        ..RawSettings::default()
    };
    assert!(settings_from(raw).is_err());
}

#[test]
fn serve_overrides_take_precedence() {
    let mut raw = RawSettings::default();
    raw.apply_serve_overrides(&ServeArgs {
        server_host: Some("0.0.0.0".to_string()),
        server_port: Some(8080),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        database_url: Some("postgres://localhost/foglio".to_string()),
        database_max_connections: Some(4),
        admin_emails: Some("admin@example.com".to_string()),
        session_ttl_hours: Some(1),
    });
    let settings = settings_from(raw).expect("settings");
    assert_eq!(settings.server.listen_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.logging.format, LogFormat::Json);
    assert_eq!(
        settings.database.url.as_deref(),
        Some("postgres://localhost/foglio")
    );
    assert_eq!(settings.database.max_connections.get(), 4);
    assert_eq!(settings.auth.admin_emails, vec!["admin@example.com"]);
    assert_eq!(settings.auth.session_ttl, Some(Duration::from_secs(3600)));
}
