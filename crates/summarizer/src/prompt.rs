use chrono::NaiveDate;
use news::Article;

/// Builds the request asking for a dated digest of the five most relevant articles.
pub fn digest_prompt(articles: &[Article], today: NaiveDate) -> String {
    let combined = articles
        .iter()
        .map(|a| format!("{} ({})\n{}", a.title, a.url, a.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut numbered = String::new();
    for n in 1..=5 {
        numbered.push_str(&format!("{n}. Headline {n} (URL {n})\nArticle {n}\n\n"));
    }

    format!(
        "Summarize the following news headlines into the top 5 most relevant news articles:\n\n\
         {combined}\n\n\
         Format it exactly in this format:\n\
         [{today}] Here are the top news articles for the day:\n\
         {}",
        numbered.trim_end()
    )
}

/// The digest returned without asking the model when nothing matched.
pub fn empty_digest(today: NaiveDate) -> String {
    format!("[{today}] No news articles matched the requested keywords.")
}
