use std::borrow::Cow;

pub struct Asset {
    pub body: Cow<'static, [u8]>,
    pub mime: String,
}

pub trait AssetSource: Send + Sync {
    fn get(&self, path: &str) -> Option<Asset>;
}
