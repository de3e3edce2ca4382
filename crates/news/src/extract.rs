//! Pure HTML extraction. Nothing here touches the network, so parsed documents never have to
//! live across an await point.

use crate::error::NewsError;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// How article links are recognised on a source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// Headline cards (`a.Card-title`).
    CnbcCards,
    /// Any link whose target contains `/news/`.
    YahooNews,
    /// Every anchor on the page.
    AllAnchors,
}

impl LinkRule {
    pub fn for_source(source: &Url) -> Self {
        match source.host_str() {
            Some(host) if host.ends_with("cnbc.com") => LinkRule::CnbcCards,
            Some(host) if host.contains("yahoo.com") => LinkRule::YahooNews,
            _ => LinkRule::AllAnchors,
        }
    }

    fn selector(&self) -> &'static str {
        match self {
            LinkRule::CnbcCards => "a.Card-title[href]",
            LinkRule::YahooNews | LinkRule::AllAnchors => "a[href]",
        }
    }

    fn accepts(&self, href: &str) -> bool {
        match self {
            LinkRule::YahooNews => href.contains("/news/"),
            LinkRule::CnbcCards | LinkRule::AllAnchors => true,
        }
    }
}

fn selector(css: &str) -> Result<Selector, NewsError> {
    Selector::parse(css).map_err(|_| NewsError::Selector(css.to_string()))
}

/// Article links on a source page, resolved against `source`, without fragments, in page order
/// and without repeats. Non-web schemes and links back to the page itself are dropped.
pub fn extract_links(html: &str, source: &Url, rule: LinkRule) -> Result<Vec<Url>, NewsError> {
    let document = Html::parse_document(html);
    let anchors = selector(rule.selector())?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !rule.accepts(href) {
            continue;
        }
        let Ok(mut url) = source.join(href) else {
            continue;
        };
        url.set_fragment(None);
        if !matches!(url.scheme(), "http" | "https") || url == *source {
            continue;
        }
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }
    Ok(links)
}

/// The readable parts of an article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,
    pub text: String,
}

/// Title from `og:title`, the first `h1` or `<title>`, and body text from the paragraphs.
pub fn parse_article(html: &str) -> Result<ParsedArticle, NewsError> {
    let document = Html::parse_document(html);

    let og_title = selector(r#"meta[property="og:title"]"#)?;
    let heading = selector("h1")?;
    let title_tag = selector("title")?;
    let paragraphs = selector("p")?;

    let text_of = |sel: &Selector| {
        document
            .select(sel)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    };

    let title = document
        .select(&og_title)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| text_of(&heading))
        .or_else(|| text_of(&title_tag))
        .unwrap_or_default();

    let text = document
        .select(&paragraphs)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(ParsedArticle { title, text })
}

/// True when any keyword occurs in the title or text, ignoring case.
pub fn matches_keywords(article: &ParsedArticle, keywords: &[String]) -> bool {
    let title = article.title.to_lowercase();
    let text = article.text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .any(|k| title.contains(&k) || text.contains(&k))
}

/// The first `chars` characters of `text`.
pub fn excerpt(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn picks_rules_by_host() {
        assert_eq!(
            LinkRule::for_source(&url("https://www.cnbc.com/world/?region=world")),
            LinkRule::CnbcCards
        );
        assert_eq!(
            LinkRule::for_source(&url("https://sg.finance.yahoo.com/topic/latestnews/")),
            LinkRule::YahooNews
        );
        assert_eq!(
            LinkRule::for_source(&url("https://example.com/news")),
            LinkRule::AllAnchors
        );
    }

    #[test]
    fn cnbc_keeps_only_card_titles() {
        let html = r#"
            <a class="Card-title" href="https://www.cnbc.com/2025/03/03/chips.html">Chips</a>
            <a class="nav" href="/markets/">Markets</a>
            <div><a class="Card-title" href="/2025/03/03/banks.html">Banks</a></div>
        "#;
        let source = url("https://www.cnbc.com/world/?region=world");
        let links = extract_links(html, &source, LinkRule::CnbcCards).unwrap();
        assert_eq!(
            links,
            vec![
                url("https://www.cnbc.com/2025/03/03/chips.html"),
                url("https://www.cnbc.com/2025/03/03/banks.html"),
            ]
        );
    }

    #[test]
    fn yahoo_keeps_news_links_once() {
        let html = r#"
            <a href="/news/fed-holds-rates-120000123.html">Fed</a>
            <a href="/quote/AAPL/">AAPL</a>
            <a href="/news/fed-holds-rates-120000123.html#comments">Fed again</a>
        "#;
        let source = url("https://sg.finance.yahoo.com/topic/latestnews/");
        let links = extract_links(html, &source, LinkRule::YahooNews).unwrap();
        assert_eq!(
            links,
            vec![url("https://sg.finance.yahoo.com/news/fed-holds-rates-120000123.html")]
        );
    }

    #[test]
    fn fallback_skips_non_web_links() {
        let html = r##"
            <a href="#top">Top</a>
            <a href="mailto:desk@example.com">Mail</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="story.html">Story</a>
        "##;
        let source = url("https://example.com/latest/");
        let links = extract_links(html, &source, LinkRule::AllAnchors).unwrap();
        assert_eq!(links, vec![url("https://example.com/latest/story.html")]);
    }

    #[test]
    fn parses_title_and_paragraphs() {
        let html = r#"<html><head>
              <title>Site | Ignored</title>
              <meta property="og:title" content="Tech stocks rally">
            </head><body>
              <h1>Headline</h1>
              <p>First paragraph.</p>
              <p>  </p>
              <p>Second <b>bold</b> paragraph.</p>
            </body></html>"#;
        let article = parse_article(html).unwrap();
        assert_eq!(article.title, "Tech stocks rally");
        assert_eq!(article.text, "First paragraph.\n\nSecond bold paragraph.");
    }

    #[test]
    fn title_falls_back_to_heading_then_title_tag() {
        let with_heading = parse_article("<h1> Banks </h1><p>x</p>").unwrap();
        assert_eq!(with_heading.title, "Banks");
        let with_title = parse_article("<title>Only title</title><p>x</p>").unwrap();
        assert_eq!(with_title.title, "Only title");
    }

    #[test]
    fn keyword_match_ignores_case() {
        let article = ParsedArticle {
            title: "Markets wrap".to_string(),
            text: "Big TECH names led the gains.".to_string(),
        };
        assert!(matches_keywords(&article, &["tech".to_string()]));
        assert!(!matches_keywords(&article, &["crypto".to_string(), " ".to_string()]));
    }

    #[test]
    fn excerpt_counts_characters() {
        assert_eq!(excerpt("héllo wörld", 7), "héllo w");
        assert_eq!(excerpt("short", 500), "short");
    }
}
