use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::app::{AppContext, FeedError, Result};
use crate::config::parse_interval;
use crate::domain::Article;
use crate::sync::{SyncEvent, TickOutcome};

pub async fn show(ctx: &AppContext, batch: Option<usize>) -> Result<()> {
    let batch = batch.unwrap_or(ctx.engine.settings().initial_batch);
    let outcome = ctx.engine.tick(batch).await?;
    report(outcome);
    print_articles(&ctx.engine.visible_list());
    Ok(())
}

pub async fn refresh(ctx: &AppContext) -> Result<()> {
    let outcome = ctx.engine.force_refresh().await?;
    report(outcome);
    print_articles(&ctx.engine.visible_list());
    Ok(())
}

pub async fn clear(ctx: &AppContext) -> Result<()> {
    ctx.engine.clear_cache().await?;
    println!("Cleared cached headlines");
    Ok(())
}

pub async fn watch(ctx: &AppContext, interval: Option<&str>) -> Result<()> {
    let every = match interval {
        Some(s) => Duration::from_secs(parse_interval(s).map_err(FeedError::Config)?),
        None => ctx.config.sync.interval(),
    };
    if every.is_zero() {
        return Err(FeedError::Config("Interval must be greater than zero".into()));
    }

    let mut events = ctx.engine.subscribe();
    let scheduler = ctx.scheduler();
    scheduler.start(every);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SyncEvent::RefreshFailed(e)) => eprintln!("Refresh failed: {}", e),
                Ok(_) => {
                    println!();
                    print_articles(&ctx.engine.visible_list());
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Missed {} sync events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    scheduler.stop().await;
    Ok(())
}

fn report(outcome: TickOutcome) {
    match outcome {
        TickOutcome::Refreshed { fetched, shown } => {
            println!("Fetched {} headlines, showing {}", fetched, shown)
        }
        TickOutcome::Paged { consumed, cursor } => {
            println!("Added {} cached headlines ({} surfaced)", consumed, cursor)
        }
        TickOutcome::Skipped => println!("Nothing to do"),
    }
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No headlines");
        return;
    }
    for (index, article) in articles.iter().enumerate() {
        println!("{}", format_article(index, article));
    }
}

fn format_article(index: usize, article: &Article) -> String {
    let marker = if article.is_pinned { "[pin] " } else { "" };
    format!(
        "{:>3}. {}{}\n     {}",
        index,
        marker,
        article.display_title(),
        article.byline()
    )
}
