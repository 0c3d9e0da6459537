//! Defines traits and implementations for keyword image search.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("image search unavailable: {0}")]
    Unavailable(String),
}

/// A service that finds an animated image for a keyword.
pub trait GifProvider {
    /// Returns the URL of the best match, or `None` when nothing matched.
    async fn search(&self, keyword: &str) -> Result<Option<String>, GifError>;
}

/// Keywords are searched with their spaces removed.
pub fn search_term(keyword: &str) -> String {
    keyword.split_whitespace().collect()
}

/// Image search backed by the Giphy API.
pub mod giphy {
    use serde::Deserialize;

    use super::*;

    const URL: &str = "https://api.giphy.com/v1/gifs/search";

    #[derive(Deserialize, Debug)]
    struct SearchResponse {
        #[serde(default)]
        data: Vec<GifObject>,
    }

    #[derive(Deserialize, Debug)]
    struct GifObject {
        images: Images,
    }

    #[derive(Deserialize, Debug)]
    struct Images {
        downsized_medium: Option<Rendition>,
    }

    #[derive(Deserialize, Debug)]
    struct Rendition {
        url: String,
    }

    impl SearchResponse {
        fn first_url(self) -> Option<String> {
            self.data
                .into_iter()
                .next()
                .and_then(|gif| gif.images.downsized_medium)
                .map(|r| r.url)
                .filter(|url| !url.is_empty())
        }
    }

    pub struct Giphy {
        api_key: String,
        client: reqwest::Client,
    }

    impl Giphy {
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                api_key: api_key.into(),
                client: reqwest::Client::new(),
            }
        }
    }

    impl GifProvider for Giphy {
        async fn search(&self, keyword: &str) -> Result<Option<String>, GifError> {
            let term = search_term(keyword);
            let resp = self
                .client
                .get(URL)
                .query(&[("api_key", self.api_key.as_str()), ("q", term.as_str()), ("limit", "1")])
                .send()
                .await?
                .error_for_status()?
                .json::<SearchResponse>()
                .await?;

            Ok(resp.first_url())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_strips_spaces() {
        assert_eq!(search_term("happy new year"), "happynewyear");
        assert_eq!(search_term(" wave "), "wave");
        assert_eq!(search_term(""), "");
    }
}
