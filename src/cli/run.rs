use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::keywords;
use crate::llm::factory;
use crate::pipeline::generator::ArticleGenerator;
use crate::pipeline::images::ImageProvider;
use crate::pipeline::runner::BatchRunner;
use crate::pipeline::writer::LocalWriter;
use crate::publisher::factory as publisher_factory;

pub async fn run(
    config_path: Option<String>,
    keywords_override: Option<String>,
    dry_run: bool,
    assume_yes: bool,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    info!("Configuration loaded");

    let keywords_path = keywords_override.unwrap_or_else(|| config.keywords_path.clone());
    let keyword_list = keywords::load_keywords(&keywords_path, &config.keyword_delimiter)?;

    let client = factory::create_client(&config, dry_run)?;
    if dry_run {
        info!("Dry run: using the mock LLM client, no outbound API calls");
    }

    let generator = ArticleGenerator::new(client.clone(), &config);
    let images = if config.fetch_real_images && config.image_count > 0 {
        Some(ImageProvider::new(client.clone(), &config)?)
    } else {
        None
    };
    let writer = LocalWriter::new(&config.save_path, config.save_mode);

    print_plan(&config, keyword_list.len());

    if !assume_yes && !confirm()? {
        println!("Cancelled.");
        return Ok(());
    }

    let publisher = if config.wordpress.enabled && !dry_run {
        match publisher_factory::create_publisher(&config.wordpress).await {
            Ok(publisher) => publisher,
            Err(e) => {
                warn!("WordPress connection failed ({}), saving locally only", e);
                None
            }
        }
    } else {
        if config.wordpress.enabled && dry_run {
            info!("Dry run: skipping WordPress publishing");
        }
        None
    };

    let started = Instant::now();
    let mut runner = BatchRunner::new(&config, generator, images, writer, publisher);
    let summary = runner.run(&keyword_list).await;
    let elapsed = started.elapsed();

    info!(
        "Batch finished: {}/{} generated, {} published, {} failed, {:.1} min",
        summary.generated,
        summary.total,
        summary.published,
        summary.failed,
        elapsed.as_secs_f64() / 60.0
    );
    println!();
    println!("Done: {}/{} articles generated", summary.generated, summary.total);
    if summary.published > 0 {
        println!("Published to WordPress: {}", summary.published);
    }
    println!("Output directory: {}", config.save_path);

    Ok(())
}

fn print_plan(config: &Config, keyword_count: usize) {
    let total = keyword_count * config.title_per_keyword;
    let eta_minutes =
        total.saturating_sub(1) as f64 * config.delay_between_posts as f64 / 60.0;

    println!();
    println!("Plan:");
    println!("  model:               {}", config.openai_model);
    println!("  keywords:            {}", keyword_count);
    println!("  titles per keyword:  {}", config.title_per_keyword);
    println!("  articles total:      {}", total);
    println!("  delay between posts: {}s", config.delay_between_posts);
    println!("  save path:           {}", config.save_path);
    println!("  save mode:           {:?}", config.save_mode);
    if config.wordpress.enabled {
        println!("  wordpress:           {}", config.wordpress.url);
        println!("  publish status:      {}", config.wordpress.status);
    } else {
        println!("  wordpress:           disabled");
    }
    println!(
        "  estimated wait time: {:.1} min (excluding generation time)",
        eta_minutes
    );
    println!();
}

fn confirm() -> Result<bool> {
    print!("Continue? (y/n): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
