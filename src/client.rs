use std::{io::Write, path::PathBuf};

use askama::Template;
use chrono::NaiveDate;
use comfy_table::{Row, Table};
use miette::IntoDiagnostic;
use tracing::info;

use newsdesk::{
    format_comment_count, format_date, image_src, login as navigate_to_login,
    logout as navigate_to_logout, present, today, Backend, ClientConfig, Config, FrontPage,
    Location, SearchClient,
};

fn clients(conf: &ClientConfig) -> miette::Result<(Backend, SearchClient)> {
    let http = conf.http()?;
    Ok((Backend::new(http.clone(), conf), SearchClient::new(http, conf)))
}

async fn resolve_api_key(conf: &ClientConfig, backend: &Backend) -> miette::Result<String> {
    match &conf.api_key {
        Some(key) => Ok(key.clone()),
        None => Ok(backend.api_key().await?),
    }
}

pub fn date(on: Option<NaiveDate>) {
    match on {
        Some(day) => println!("{}", format_date(day)),
        None => println!("{}", today()),
    }
}

pub async fn key(conf: ClientConfig) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    println!("{}", backend.api_key().await?);
    Ok(())
}

pub async fn search(conf: ClientConfig, query: String) -> miette::Result<()> {
    let (backend, search) = clients(&conf)?;
    let api_key = resolve_api_key(&conf, &backend).await?;
    let articles = search.search(&query, Some(&api_key)).await?;

    let mut table = Table::new();
    table.set_header(Row::from(vec!["Title", "URL", "Image"]));
    for article in &articles {
        let summary = present(article);
        table.add_row(Row::from(&[
            summary.title.as_str(),
            summary.url.as_str(),
            image_src(article),
        ]));
    }
    println!("{table}");

    Ok(())
}

pub async fn front(
    conf: Config,
    query: Option<String>,
    output: Option<PathBuf>,
) -> miette::Result<()> {
    let (backend, search) = clients(&conf.client)?;
    let mut page_conf = conf.page;
    if let Some(query) = query {
        page_conf.query = query;
    }

    let api_key = conf.client.api_key.as_deref();
    let page = FrontPage::load(&page_conf, &search, &backend, api_key).await;
    let html = page.render().into_diagnostic()?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, html).await.into_diagnostic()?;
            info!(path = %path.display(), "front page written");
        }
        None => println!("{html}"),
    }

    Ok(())
}

pub async fn whoami(conf: ClientConfig) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    match backend.current_user().await {
        Some(email) => println!("Logged in as {email}"),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn comments(conf: ClientConfig, title: String) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    let comments = backend.list_comments(&title).await;

    let mut table = Table::new();
    table.set_header(Row::from(vec!["ID", "User", "Status", "Comment"]));
    for comment in &comments {
        let content = if comment.is_reply() {
            format!("↳ {}", comment.content)
        } else {
            comment.content.clone()
        };
        let status = comment.moderation().to_string();
        table.add_row(Row::from(&[
            comment.id.as_deref().unwrap_or("-"),
            comment.user.as_str(),
            status.as_str(),
            content.as_str(),
        ]));
    }
    println!("{table}");
    println!(
        "{} comment(s)",
        format_comment_count(u64::try_from(comments.len()).ok())
    );

    Ok(())
}

pub async fn comment(
    conf: ClientConfig,
    title: String,
    content: Option<String>,
    parent: Option<String>,
) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    if backend.current_user().await.is_none() {
        println!("You need to be logged in to comment.");
        return Ok(());
    }

    let content = match content {
        Some(c) => c,
        None => {
            print!("Please enter your comment: ");
            std::io::stdout().flush().into_diagnostic()?;
            let mut buf = String::new();
            std::io::stdin().read_line(&mut buf).into_diagnostic()?;
            buf.trim().to_owned()
        }
    };

    if backend
        .create_comment(&title, &content, parent.as_deref())
        .await
    {
        println!("Comment added.");
    } else {
        println!("The comment could not be added.");
    }

    Ok(())
}

pub async fn delete(conf: ClientConfig, id: String) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    if backend.delete_comment(&id).await {
        println!("Comment deleted.");
    } else {
        println!("The comment could not be deleted.");
    }
    Ok(())
}

pub async fn redact(conf: ClientConfig, title: String, user: String) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    if backend.redact_comment(&title, &user).await {
        println!("Comment by {user} redacted.");
    } else {
        println!("The comment could not be redacted.");
    }
    Ok(())
}

pub async fn remove(conf: ClientConfig, title: String, user: String) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    if backend.remove_comment(&title, &user).await {
        println!("Comment by {user} removed.");
    } else {
        println!("The comment could not be removed.");
    }
    Ok(())
}

pub fn login(conf: ClientConfig) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    let mut location = Location::default();
    navigate_to_login(&mut location);
    if let Some(href) = location.href {
        println!("Sign in at {}", backend.url(&href));
        println!("then set `session` under [client] to the session cookie the backend hands out.");
    }
    Ok(())
}

pub async fn logout(conf: ClientConfig) -> miette::Result<()> {
    let backend = Backend::from_config(&conf)?;
    let mut location = Location::default();
    navigate_to_logout(&mut location);
    if let Some(href) = location.href {
        backend.visit(&href).await;
    }
    Ok(())
}
