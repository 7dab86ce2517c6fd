use url::Url;

use crate::app::Result;

/// URL layout of the provider, rooted at one base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self { base })
    }

    pub fn catalog(&self) -> String {
        self.join(&["list.json"])
    }

    pub fn article(&self, id: &str) -> String {
        self.join(&["articles", &format!("{id}.json")])
    }

    pub fn media(&self, id: &str) -> String {
        self.join(&["media", &format!("{id}.json")])
    }

    /// Append path segments to the base, percent-encoding each one.
    fn join(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        // Checked in `new`: the base always has a path to extend.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }
}
