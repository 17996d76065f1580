use gemrelay_core::{Asset, AssetSource};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "public/"]
struct PublicAssets;

pub(crate) struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn get(&self, path: &str) -> Option<Asset> {
        let file = PublicAssets::get(path)?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Some(Asset {
            body: file.data,
            mime: mime.as_ref().to_string(),
        })
    }
}
