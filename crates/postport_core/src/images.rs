use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Remote image URL to the local reference that replaces it.
pub type ImageMap = BTreeMap<String, String>;

static IMAGE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\(([^)\n]+)\)").unwrap());

/// Absolute `http`/`https` image URLs in Markdown image syntax, in order of
/// appearance. Duplicates are kept; relative paths and data URIs are not.
pub fn find_image_urls(body: &str) -> Vec<String> {
    IMAGE_URL_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let target = caps[1].trim();
            let token = match target.strip_prefix('<') {
                Some(rest) => rest.split_once('>').map_or(rest, |(inside, _)| inside),
                None => target.split_whitespace().next()?,
            };
            is_remote(token).then(|| token.to_string())
        })
        .collect()
}

/// Distinct remote URLs to download for one post, cover image first.
pub fn collect_image_urls(cover_image: Option<&str>, body: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let cover = cover_image
        .map(str::trim)
        .filter(|c| is_remote(c))
        .map(str::to_string);
    for url in cover.into_iter().chain(find_image_urls(body)) {
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

pub fn is_remote(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Replaces every occurrence of each mapped URL. Longer URLs go first so a
/// URL that prefixes another one cannot clobber it.
pub fn rewrite_urls(text: &str, map: &ImageMap) -> String {
    let mut pairs: Vec<(&String, &String)> = map.iter().collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    pairs
        .into_iter()
        .fold(text.to_string(), |acc, (remote, local)| acc.replace(remote.as_str(), local))
}

/// A normalized post whose body and cover image can point at local files.
pub trait RewritableImages {
    fn slug(&self) -> &str;
    fn body(&self) -> &str;
    fn cover_image(&self) -> Option<&str>;
    fn image_fields_mut(&mut self) -> (&mut String, &mut Option<String>);

    fn image_urls(&self) -> Vec<String> {
        collect_image_urls(self.cover_image(), self.body())
    }

    /// Rewrites body and cover image independently with the same map.
    fn rewrite_images(&mut self, map: &ImageMap) {
        if map.is_empty() {
            return;
        }
        let (body, cover) = self.image_fields_mut();
        *body = rewrite_urls(body, map);
        if let Some(cover) = cover.as_mut() {
            *cover = rewrite_urls(cover, map);
        }
    }
}
