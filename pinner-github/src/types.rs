//! Release and asset types returned by the hosting API.

use serde::{Deserialize, Serialize};

/// Asset holding the plugin's executable bundle.
pub const BUNDLE_ASSET: &str = "main.js";

/// Asset holding the plugin's descriptor.
pub const DESCRIPTOR_ASSET: &str = "manifest.json";

/// Optional stylesheet asset.
pub const STYLESHEET_ASSET: &str = "styles.css";

/// A downloadable file attached to a release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// A release looked up by tag. Fetched per sync attempt and never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// The files a release must carry to be installable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginAssets {
    pub bundle: ReleaseAsset,
    pub descriptor: ReleaseAsset,
    pub stylesheet: Option<ReleaseAsset>,
}

impl Release {
    /// Finds an asset by exact file name.
    pub fn find_asset(&self, filename: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == filename)
    }

    /// Returns the bundle, descriptor and optional stylesheet, or `None`
    /// if either required asset is missing.
    pub fn required_assets(&self) -> Option<PluginAssets> {
        let bundle = self.find_asset(BUNDLE_ASSET)?.clone();
        let descriptor = self.find_asset(DESCRIPTOR_ASSET)?.clone();
        let stylesheet = self.find_asset(STYLESHEET_ASSET).cloned();

        Some(PluginAssets {
            bundle,
            descriptor,
            stylesheet,
        })
    }
}
