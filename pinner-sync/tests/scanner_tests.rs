mod support;

use pinner_sync::{
    reconcile_entries, InstalledPlugin, LocalFs, PluginDescriptor, PluginScanner,
    TrackedPluginEntry,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{descriptor_json, Vault};

fn scanner(vault: &Vault) -> PluginScanner {
    PluginScanner::new(vault.fs(), vault.layout.clone())
}

fn entry(id: &str, url: &str, version: &str, enabled: bool) -> TrackedPluginEntry {
    TrackedPluginEntry {
        id: id.into(),
        url: url.into(),
        version: version.into(),
        enabled,
    }
}

fn installed(id: &str, version: &str) -> InstalledPlugin {
    InstalledPlugin {
        id: id.into(),
        descriptor: PluginDescriptor::parse(&descriptor_json(id, version)).unwrap(),
    }
}

// --- Scan ---

#[tokio::test]
async fn scan_reads_every_descriptor() {
    let vault = Vault::new();
    vault.install_plugin("calendar", "1.5.10");
    vault.install_plugin("dataview", "0.5.64");

    let found = scanner(&vault).scan_installed().await;

    assert_eq!(found, vec![installed("calendar", "1.5.10"), installed("dataview", "0.5.64")]);
}

#[tokio::test]
async fn scan_uses_directory_name_as_id() {
    let vault = Vault::new();
    vault.install_raw("local-folder", &descriptor_json("declared-id", "1.0.0"));

    let found = scanner(&vault).scan_installed().await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "local-folder");
    assert_eq!(found[0].descriptor.id, "declared-id");
}

#[tokio::test]
async fn scan_skips_invalid_and_missing_descriptors() {
    let vault = Vault::new();
    vault.install_plugin("good", "1.0.0");
    vault.install_raw("broken", "{ \"id\": ");
    vault.install_raw("incomplete", "{\"id\": \"incomplete\", \"version\": \"1.0.0\"}");
    std::fs::create_dir_all(vault.path(".obsidian/plugins/empty")).unwrap();
    std::fs::write(vault.path(".obsidian/plugins/stray-file.txt"), "x").unwrap();

    let found = scanner(&vault).scan_installed().await;

    assert_eq!(found, vec![installed("good", "1.0.0")]);
}

#[tokio::test]
async fn scan_without_plugin_root_is_empty() {
    let vault = Vault::new();
    assert!(scanner(&vault).scan_installed().await.is_empty());
}

#[tokio::test]
async fn scan_honours_custom_config_dir() {
    let vault = Vault::new();
    let dir = vault.path(".config-alt/plugins/widget-id");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("manifest.json"), descriptor_json("widget-id", "3.0.0")).unwrap();

    let scanner = PluginScanner::new(
        Arc::new(LocalFs::new(vault.dir.path())),
        pinner_sync::HostLayout::new(".config-alt"),
    );
    assert_eq!(scanner.scan_installed().await, vec![installed("widget-id", "3.0.0")]);
}

// --- Reconcile ---

#[test]
fn reconcile_updates_versions_and_keeps_leftovers_last() {
    let desired = vec![
        entry("a", "https://github.com/acme/a", "1.0.0", true),
        entry("b", "https://github.com/acme/b", "2.0.0", true),
    ];

    let merged = reconcile_entries(&desired, &[installed("a", "1.1.0")]);

    assert_eq!(
        merged,
        vec![
            entry("a", "https://github.com/acme/a", "1.1.0", true),
            entry("b", "https://github.com/acme/b", "2.0.0", true),
        ]
    );
}

#[test]
fn reconcile_preserves_url_and_enabled() {
    let desired = vec![entry("a", "https://github.com/acme/a", "1.0.0", false)];

    let merged = reconcile_entries(&desired, &[installed("a", "0.9.0")]);

    assert_eq!(merged, vec![entry("a", "https://github.com/acme/a", "0.9.0", false)]);
}

#[test]
fn reconcile_adds_unknown_plugins_disabled_without_url() {
    let merged = reconcile_entries(&[], &[installed("calendar", "1.5.10")]);
    assert_eq!(merged, vec![entry("calendar", "", "1.5.10", false)]);
}

#[test]
fn reconcile_orders_installed_by_scan_then_leftovers() {
    let desired = vec![
        entry("pinned-only", "https://github.com/acme/p", "1.0.0", true),
        entry("b", "https://github.com/acme/b", "1.0.0", true),
        entry("", "https://github.com/acme/new", "0.1.0", true),
    ];
    let scan = vec![installed("a", "3.0.0"), installed("b", "1.2.0")];

    let merged = reconcile_entries(&desired, &scan);

    let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "pinned-only", ""]);
    assert_eq!(merged[1].version, "1.2.0");
    assert_eq!(merged[3], desired[2]);
}

#[tokio::test]
async fn reconcile_against_disk() {
    let vault = Vault::new();
    vault.install_plugin("a", "1.1.0");
    let desired = vec![
        entry("a", "https://github.com/acme/a", "1.0.0", true),
        entry("b", "https://github.com/acme/b", "2.0.0", true),
    ];

    let merged = scanner(&vault).reconcile(&desired).await;

    assert_eq!(merged[0].version, "1.1.0");
    assert_eq!(merged[1], desired[1]);
}
