//! Server-rendered pages. Every interpolated value goes through [`escape_html`].

use ns_core::{Article, Comment};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<nav><a href="/articles">Articles</a> | <a href="/scrape">Scrape new articles</a></nav>
<main>
{body}
</main>
<script src="/app.js"></script>
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

fn render_comment(article: &Article, comment: &Comment) -> String {
    format!(
        r#"<li class="comment" data-id="{id}"><p>{body}</p><time datetime="{iso}">{date}</time> <a class="delete-comment" href="/articles/{article_id}/comments/{id}/delete">delete</a></li>"#,
        id = escape_html(&comment.id),
        body = escape_html(&comment.body),
        iso = comment.date.to_rfc3339(),
        date = comment.date.format(DATE_FORMAT),
        article_id = escape_html(&article.id),
    )
}

fn render_article(article: &Article) -> String {
    let headline = article.headline.as_deref().unwrap_or(&article.url);
    let summary = article
        .summary
        .as_deref()
        .map(|s| format!("<p class=\"summary\">{}</p>", escape_html(s)))
        .unwrap_or_default();
    let comments: String = article
        .comments
        .iter()
        .map(|c| render_comment(article, c))
        .collect();

    format!(
        r#"<article class="article" data-id="{id}">
<h2><a href="{url}" target="_blank" rel="noopener">{headline}</a></h2>
{summary}
<time datetime="{iso}">{date}</time>
<ul class="comments">{comments}</ul>
<form class="comment-form" method="post" action="/articles/{id}/comments">
<textarea name="comment" required></textarea>
<button type="submit">Comment</button>
</form>
</article>"#,
        id = escape_html(&article.id),
        url = escape_html(&article.url),
        headline = escape_html(headline),
        summary = summary,
        iso = article.date.to_rfc3339(),
        date = article.date.format(DATE_FORMAT),
        comments = comments,
    )
}

/// The article list page, fed by `{articles}`
pub fn render_articles(articles: &[Article]) -> String {
    let body = if articles.is_empty() {
        r#"<p class="empty">No articles yet. <a href="/scrape">Scrape some.</a></p>"#.to_string()
    } else {
        articles.iter().map(render_article).collect::<Vec<_>>().join("\n")
    };
    layout("News Scrape", &body)
}

/// The page shown after a scrape, fed by `{message}`
pub fn render_scrape(message: &str) -> String {
    let body = format!(
        r#"<p class="message">{}</p><p><a href="/articles">Back to articles</a></p>"#,
        escape_html(message)
    );
    layout("Scrape", &body)
}
