use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span};

use feed_channels::ChannelRegistry;
use feed_map::{PreviewPage, build_preview};
use feed_model::{ChannelField, Shop};
use feed_output::export_file_name;
use feed_store::{JsonFileRepository, ShopStore};

use feed_cli::pipeline::{export_shop_feed, ingest, load_mappings, run_map};
use feed_cli::settings::Settings;

use crate::cli::{InspectArgs, MapArgs, PreviewArgs, ShopCommand};
use crate::summary::{
    channels_table, comments_table, preview_table, print_map_outcome, schema_table, shops_table,
};

pub fn run_channels(settings: &Settings) -> Result<()> {
    let registry = settings.channel_registry()?;
    println!("Channel table version: {}", registry.version());
    println!("{}", channels_table(&registry));
    Ok(())
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let feed = ingest(&args.feed)?;
    println!("Feed: {}", args.feed.display());
    println!("Records: {}", feed.len());
    println!("{}", schema_table(&feed));
    Ok(())
}

pub fn run_map_command(settings: &Settings, args: &MapArgs) -> Result<()> {
    let span = info_span!("map_command", feed = %args.feed.display());
    let _guard = span.enter();

    let registry = settings.channel_registry()?;
    let schema = channel_schema(&registry, args.channel.as_deref())?;
    let mappings = load_mappings(&args.mappings)?;
    let feed = ingest(&args.feed)?;

    let outcome = run_map(&feed, &mappings, schema, &settings.xml_options())?;
    if args.stdout {
        println!("{}", outcome.xml);
        return Ok(());
    }

    let shop_name = args.shop.clone().unwrap_or_else(|| file_stem(&args.feed));
    let path = args.output.clone().unwrap_or_else(|| {
        settings
            .export
            .output_dir
            .join(export_file_name(&shop_name, args.channel.as_deref()))
    });
    write_output(&path, &outcome.xml)?;
    print_map_outcome(&outcome, args.channel.as_deref(), &path);
    Ok(())
}

pub fn run_preview(settings: &Settings, args: &PreviewArgs) -> Result<()> {
    let mappings = load_mappings(&args.mappings)?;
    let feed = ingest(&args.feed)?;
    let rows = build_preview(&feed.records, &mappings, &args.field)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let pages = PreviewPage::new(rows, settings.preview.page_size);
    if args.page == 0 || args.page > pages.total_pages() {
        bail!(
            "page {} out of range (1-{})",
            args.page,
            pages.total_pages()
        );
    }
    println!("Field: {}", args.field);
    println!("{}", preview_table(pages.page(args.page)));
    println!(
        "Page {} of {} ({} records)",
        args.page,
        pages.total_pages(),
        pages.rows().len()
    );
    Ok(())
}

pub fn run_shop(settings: &Settings, command: &ShopCommand) -> Result<()> {
    let store_path = settings.store_path();
    let mut store = ShopStore::open(JsonFileRepository::new(&store_path))?;

    match command {
        ShopCommand::List { search } => {
            let shops: Vec<&Shop> = match search {
                Some(term) => store.search(term),
                None => store.shops().iter().collect(),
            };
            if shops.is_empty() {
                println!("No shops in {}", store_path.display());
            } else {
                println!("{}", shops_table(&shops));
            }
        }
        ShopCommand::Add { name, feed } => {
            let xml = feed.as_deref().map(read_feed_text).transpose()?;
            let shop = store.add_shop(name, xml)?;
            println!(
                "Added shop {} ({}) with {} products",
                shop.name, shop.id, shop.product_count
            );
        }
        ShopCommand::Delete { shop } => {
            let id = store.find(shop)?.id.clone();
            let removed = store.delete_shop(&id)?;
            println!("Deleted shop {} ({})", removed.name, removed.id);
        }
        ShopCommand::Rename { shop, name } => {
            let id = store.find(shop)?.id.clone();
            store.rename_shop(&id, name)?;
        }
        ShopCommand::Upload { shop, feed } => {
            let id = store.find(shop)?.id.clone();
            let count = store.upload_feed(&id, read_feed_text(feed)?)?;
            println!("Uploaded {count} products");
        }
        ShopCommand::AddChannel {
            shop,
            channel,
            name,
        } => {
            let registry = settings.channel_registry()?;
            let definition = registry.get(channel).ok_or_else(|| {
                anyhow!(
                    "unknown channel '{channel}' (known: {})",
                    registry.ids().collect::<Vec<_>>().join(", ")
                )
            })?;
            let id = store.find(shop)?.id.clone();
            let display = name.as_deref().unwrap_or(&definition.name);
            store.add_channel(&id, &definition.id, display)?;
        }
        ShopCommand::RemoveChannel { shop, channel } => {
            let id = store.find(shop)?.id.clone();
            store.delete_channel(&id, channel)?;
        }
        ShopCommand::SaveMappings {
            shop,
            mappings,
            channel,
        } => {
            let mappings = load_mappings(mappings)?;
            let id = store.find(shop)?.id.clone();
            let count = mappings.len();
            match channel {
                Some(channel) => store.save_channel_mappings(&id, channel, mappings)?,
                None => store.save_internal_mappings(&id, mappings)?,
            }
            println!("Saved {count} mappings");
        }
        ShopCommand::Comment { shop, text, field } => {
            let id = store.find(shop)?.id.clone();
            let comment = store.add_comment(&id, text, field.as_deref())?;
            println!("Added comment {}", comment.id);
        }
        ShopCommand::Comments { shop, field } => {
            let shop = store.find(shop)?;
            match field {
                Some(field) => println!("{}", comments_table(shop.comments_for_field(field))),
                None => println!("{}", comments_table(&shop.comments)),
            }
        }
        ShopCommand::DeleteComment { shop, comment } => {
            let id = store.find(shop)?.id.clone();
            store.delete_comment(&id, comment)?;
        }
        ShopCommand::AbTest { shop, label } => {
            let id = store.find(shop)?.id.clone();
            store.add_ab_test(&id, label)?;
        }
        ShopCommand::Lock { shop } => {
            let id = store.find(shop)?.id.clone();
            let locked = store.toggle_lock(&id)?;
            println!(
                "Shop {id} is now {}",
                if locked { "locked" } else { "unlocked" }
            );
        }
        ShopCommand::Export {
            shop,
            channel,
            output,
        } => {
            let shop = store.find(shop)?;
            let registry = settings.channel_registry()?;
            let path = export_shop(settings, &registry, shop, channel.as_deref(), output.clone())?;
            println!("Exported {}", path.display());
        }
        ShopCommand::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every shop without --yes");
            }
            store.clear()?;
        }
    }
    Ok(())
}

fn export_shop(
    settings: &Settings,
    registry: &ChannelRegistry,
    shop: &Shop,
    channel: Option<&str>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let xml = export_shop_feed(shop, registry, channel, &settings.xml_options())?;
    let path = output.unwrap_or_else(|| {
        settings
            .export
            .output_dir
            .join(export_file_name(&shop.name, channel))
    });
    write_output(&path, &xml)?;
    info!(path = %path.display(), shop = %shop.id, "exported shop feed");
    Ok(path)
}

fn channel_schema<'a>(
    registry: &'a ChannelRegistry,
    channel: Option<&str>,
) -> Result<Option<&'a [ChannelField]>> {
    channel
        .map(|id| registry.schema(id))
        .transpose()
        .map_err(Into::into)
}

fn read_feed_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read feed {}", path.display()))
}

fn write_output(path: &Path, xml: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, xml).with_context(|| format!("write {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("feed")
        .to_string()
}
