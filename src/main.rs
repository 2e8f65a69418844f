use clap::{Parser, Subcommand};
use folio_render::metadata::{DirImageSource, extract_exif};
use folio_render::reading_time::{Language, reading_time};
use folio_render::{config, markdown, output, preview, toc};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio-render")]
#[command(about = "Markdown rendering pipeline for blog, project and photo pages")]
#[command(long_about = "\
Markdown rendering pipeline for blog, project and photo pages

Supported syntax on top of the usual headings, emphasis, links, lists,
quotes and fenced code:

  [[My Post]]               wiki link to <wiki_route>/my-post
  ![[photo.jpg]]            image served from <image_endpoint>/photo.jpg
  https://youtu.be/<id>     a bare URL on its own line becomes an embed
                            (YouTube, Twitter/X, Spotify, .mp4/.webm/...)

Run 'folio-render gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a markdown file to HTML
    Render {
        file: PathBuf,
        /// Render images as clickable photo frames
        #[arg(long)]
        frames: bool,
        /// Wrap the output in a standalone preview page
        #[arg(long)]
        page: bool,
        /// Language for the preview page labels
        #[arg(long, value_enum, default_value_t = Language::En)]
        lang: Language,
    },
    /// List the headings a table of contents would show
    Toc {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Estimate reading time for a markdown file
    ReadingTime {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Language::En)]
        lang: Language,
    },
    /// Print the EXIF metadata the lightbox would show for an image
    Exif {
        image: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn page_title(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Preview".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let load_config = || config::load_config(&cli.config_dir);

    match cli.command {
        Command::Render {
            file,
            frames,
            page,
            lang,
        } => {
            let config = load_config()?;
            let content = std::fs::read_to_string(&file)?;
            let document = markdown::render(&content, &config.render_options(frames));
            if page {
                let toc = toc::table_of_contents(&content);
                let input = preview::PreviewInput {
                    document: &document,
                    toc: &toc,
                    reading_time: reading_time(&content, config.reading.words_per_minute),
                    language: lang,
                };
                println!("{}", preview::render_page(&page_title(&file), &input).into_string());
            } else {
                println!("{}", document);
            }
        }
        Command::Toc { file, json } => {
            let content = std::fs::read_to_string(&file)?;
            let toc = toc::table_of_contents(&content);
            if json {
                println!("{}", serde_json::to_string_pretty(&toc)?);
            } else {
                output::print_toc(&toc);
            }
        }
        Command::ReadingTime { file, lang } => {
            let config = load_config()?;
            let content = std::fs::read_to_string(&file)?;
            let estimate = reading_time(&content, config.reading.words_per_minute);
            output::print_reading_time(&estimate, lang);
        }
        Command::Exif { image, json } => {
            let config = load_config()?;
            let root = image
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| format!("not a file: {}", image.display()))?;
            let source = DirImageSource::new(root, config.links.image_endpoint.as_str());
            let url = format!(
                "{}/{}",
                config.links.image_endpoint,
                markdown::encode_filename(&name)
            );
            let exif = extract_exif(&source, &url);
            if json {
                println!("{}", serde_json::to_string_pretty(&exif)?);
            } else {
                output::print_exif(&image.display().to_string(), exif.as_ref());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
