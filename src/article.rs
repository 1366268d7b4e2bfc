use serde::{de::IgnoredAny, Deserialize, Deserializer};

/// Image shown on a card when the article carries none.
pub const FALLBACK_IMAGE: &str = "images/image2.png";

/// A search result document, as the search API returns it.
#[derive(Clone, Debug, Deserialize)]
pub struct Article {
    pub headline: Headline,
    pub web_url: String,
    #[serde(rename = "abstract", default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default)]
    pub multimedia: Option<Multimedia>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Headline {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main: String,
}

/// The search API has shipped both an object keyed by rendition and a flat
/// list of images. Anything else is kept as `Other` and shows the fallback.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Multimedia {
    List(Vec<Image>),
    Renditions {
        #[serde(default)]
        default: Option<Image>,
        #[serde(default)]
        thumbnail: Option<Image>,
    },
    Other(IgnoredAny),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// What a card links to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleSummary {
    pub title: String,
    pub url: String,
}

pub fn present(article: &Article) -> ArticleSummary {
    ArticleSummary {
        title: article.headline.main.clone(),
        url: article.web_url.clone(),
    }
}

/// `multimedia.default.url`, or the first image with a url for the list
/// shape, or [`FALLBACK_IMAGE`].
pub fn image_src(article: &Article) -> &str {
    let found = match &article.multimedia {
        Some(Multimedia::Renditions { default, .. }) => {
            default.as_ref().and_then(|image| image.url.as_deref())
        }
        Some(Multimedia::List(images)) => images.iter().find_map(|image| image.url.as_deref()),
        Some(Multimedia::Other(_)) | None => None,
    };

    found.filter(|url| !url.is_empty()).unwrap_or(FALLBACK_IMAGE)
}

/// Everything the front page shows for one article.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleCard {
    pub title: String,
    pub url: String,
    pub image_src: String,
    pub summary: String,
    pub comments: u64,
}

impl ArticleCard {
    pub fn new(article: &Article, comments: u64) -> Self {
        let ArticleSummary { title, url } = present(article);
        ArticleCard {
            title,
            url,
            image_src: image_src(article).to_owned(),
            summary: article.summary.clone(),
            comments,
        }
    }
}
