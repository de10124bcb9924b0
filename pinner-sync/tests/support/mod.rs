#![allow(dead_code)]

use async_trait::async_trait;
use pinner_github::{GitHubConfig, ReleaseClient};
use pinner_sync::{DirListing, HostLayout, LocalFs, PluginFs, SyncError, SyncResult};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WIDGET_URL: &str = "https://github.com/acme/widget";

/// A throwaway vault on disk.
pub struct Vault {
    pub dir: TempDir,
    pub fs: Arc<LocalFs>,
    pub layout: HostLayout,
}

impl Vault {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let fs = Arc::new(LocalFs::new(dir.path()));
        Self {
            dir,
            fs,
            layout: HostLayout::default(),
        }
    }

    pub fn fs(&self) -> Arc<dyn PluginFs> {
        self.fs.clone()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn plugin_path(&self, id: &str, file: &str) -> PathBuf {
        self.path(&self.layout.plugin_file(id, file))
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    /// Creates `<plugins>/<dir_name>/manifest.json` with `contents`.
    pub fn install_raw(&self, dir_name: &str, contents: &str) {
        let dir = self.path(&self.layout.plugin_dir(dir_name));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("manifest.json"), contents).unwrap();
    }

    pub fn install_plugin(&self, id: &str, version: &str) {
        self.install_raw(id, &descriptor_json(id, version));
    }
}

pub fn client(server: &MockServer) -> Arc<ReleaseClient> {
    Arc::new(ReleaseClient::new(GitHubConfig::with_base_url(server.uri())).unwrap())
}

pub fn descriptor_json(id: &str, version: &str) -> String {
    format!(
        "{{\n  \"id\": \"{id}\",\n  \"name\": \"{id}\",\n  \"version\": \"{version}\",\n  \"minAppVersion\": \"1.4.0\",\n  \"author\": \"acme\"\n}}\n"
    )
}

fn asset_path(repo: &str, tag: &str, name: &str) -> String {
    format!("/dl/acme/{repo}/{tag}/{name}")
}

/// Mounts `GET /repos/acme/<repo>/releases/tags/<tag>` listing `assets`.
/// The server verifies on drop that it saw exactly `calls` lookups.
pub async fn mount_release(server: &MockServer, repo: &str, tag: &str, assets: &[&str], calls: u64) {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "browser_download_url": format!("{}{}", server.uri(), asset_path(repo, tag, name)),
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/releases/tags/{tag}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tag_name": tag,
                "assets": assets,
            })),
        )
        .expect(calls)
        .mount(server)
        .await;
}

pub async fn mount_missing_release(server: &MockServer, repo: &str, tag: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/releases/tags/{tag}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found"
        })))
        .mount(server)
        .await;
}

pub async fn mount_asset(server: &MockServer, repo: &str, tag: &str, name: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(asset_path(repo, tag, name)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Like [`mount_asset`], for bodies that are not text.
pub async fn mount_asset_bytes(server: &MockServer, repo: &str, tag: &str, name: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(asset_path(repo, tag, name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mounts a complete installable release of `acme/<repo>` whose descriptor
/// declares `plugin_id`.
pub async fn mount_plugin(server: &MockServer, repo: &str, tag: &str, plugin_id: &str, with_styles: bool) {
    let mut assets = vec!["main.js", "manifest.json"];
    if with_styles {
        assets.push("styles.css");
    }
    mount_release(server, repo, tag, &assets, 1).await;
    mount_asset(server, repo, tag, "main.js", 200, &format!("// {plugin_id} {tag}\n")).await;
    mount_asset(server, repo, tag, "manifest.json", 200, &descriptor_json(plugin_id, tag)).await;
    if with_styles {
        mount_asset(server, repo, tag, "styles.css", 200, ".widget { color: red; }\n").await;
    }
}

/// Delegates to a [`LocalFs`] but fails writes to paths ending in `suffix`.
pub struct FailingWritesFs {
    pub inner: LocalFs,
    pub suffix: String,
}

impl FailingWritesFs {
    pub fn new(inner: LocalFs, suffix: &str) -> Self {
        Self {
            inner,
            suffix: suffix.to_string(),
        }
    }

    fn check(&self, path: &str) -> SyncResult<()> {
        if path.ends_with(&self.suffix) {
            return Err(SyncError::Fs {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginFs for FailingWritesFs {
    async fn exists(&self, path: &str) -> SyncResult<bool> {
        self.inner.exists(path).await
    }

    async fn mkdir(&self, path: &str) -> SyncResult<()> {
        self.inner.mkdir(path).await
    }

    async fn read(&self, path: &str) -> SyncResult<String> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, data: &str) -> SyncResult<()> {
        self.check(path)?;
        self.inner.write(path, data).await
    }

    async fn write_binary(&self, path: &str, data: &[u8]) -> SyncResult<()> {
        self.check(path)?;
        self.inner.write_binary(path, data).await
    }

    async fn list(&self, path: &str) -> SyncResult<DirListing> {
        self.inner.list(path).await
    }
}
