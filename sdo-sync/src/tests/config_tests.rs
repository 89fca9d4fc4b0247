use crate::config::{
    dedup_channels, parse_base_url, retention_from_hours, Channel, SyncConfig, CHANNELS,
};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_channel_ids_round_trip() {
    let ids: Vec<&str> = CHANNELS.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["94", "171", "193", "211", "304", "335"]);

    assert_eq!("304".parse::<Channel>().unwrap(), Channel::A304);
    assert_eq!(Channel::A171.to_string(), "171");
}

#[test]
fn test_unknown_channel_is_rejected() {
    let err = "1600".parse::<Channel>().unwrap_err();
    assert!(err.to_string().contains("Unknown channel '1600'"));
}

#[test]
fn test_dedup_channels_keeps_order() {
    let channels = dedup_channels(vec![Channel::A335, Channel::A94, Channel::A335]);
    assert_eq!(channels, vec![Channel::A335, Channel::A94]);
}

#[test]
fn test_parse_base_url() {
    assert_eq!(
        parse_base_url("https://example.com/jp2/AIA").unwrap().as_str(),
        "https://example.com/jp2/AIA/"
    );
    assert_eq!(
        parse_base_url("https://example.com/jp2/AIA/").unwrap().as_str(),
        "https://example.com/jp2/AIA/"
    );
    assert!(parse_base_url("not a url").is_err());
    assert!(parse_base_url("mailto:someone@example.com").is_err());
}

#[test]
fn test_default_config() {
    let config = SyncConfig::default();
    assert_eq!(config.base_url.as_str(), "https://helioviewer.org/jp2/AIA/");
    assert_eq!(config.channels.len(), 6);
    assert_eq!(config.extension, "jp2");
    assert_eq!(config.retention, Duration::from_secs(24 * 60 * 60));
    assert!(!config.dry_run);
    assert_eq!(config.channel_dir(Channel::A211), PathBuf::from("./211"));
}

#[test]
fn test_retention_from_hours() {
    assert_eq!(retention_from_hours(24).unwrap(), Duration::from_secs(24 * 60 * 60));
    assert_eq!(retention_from_hours(0).unwrap(), Duration::ZERO);

    let err = retention_from_hours(u64::MAX).unwrap_err();
    assert!(err.to_string().contains("too large"));
}
