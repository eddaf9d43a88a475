// ABOUTME: Main entry point for the carousel-slides program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use carousel::llm::{DEFAULT_NICHE, DEFAULT_TONE};
use carousel::{
    CarouselTheme, CarouselVariant, Config, Deck, GenerationRequest, ImageSource, SlideGenerator,
    SlideLayout,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split pasted text into slides and store them in the deck
    Split(SplitArgs),

    /// Draft slides from a topic with the completion service
    Generate(GenerateArgs),

    /// Attach an image to a slide or to the cover
    Attach(AttachArgs),

    /// Edit the text or layout of one slide
    Edit(EditArgs),

    /// Change the carousel colors and profile handle
    Theme(ThemeArgs),

    /// Write an HTML preview of the deck
    Html(HtmlArgs),

    /// Render every slide to PNG and bundle them into a ZIP
    Export(ExportArgs),

    /// Run the generation HTTP endpoint
    Serve(ServeArgs),
}

#[derive(Args)]
struct DeckArg {
    /// Path to the deck JSON file
    #[arg(short, long, default_value = "deck.json")]
    deck: PathBuf,
}

#[derive(Args)]
struct SplitArgs {
    /// Text file to split, or '-' for stdin
    #[arg(short, long)]
    input: String,

    /// Number of slides (clamped to 3..=9)
    #[arg(short = 'n', long, default_value_t = 9, allow_negative_numbers = true)]
    count: i64,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct GenerateArgs {
    /// Carousel topic
    #[arg(short, long)]
    topic: String,

    /// Number of slides (clamped to 3..=9)
    #[arg(short = 'n', long, default_value_t = 9, allow_negative_numbers = true)]
    count: i64,

    /// Profile niche passed to the prompt
    #[arg(long, default_value = DEFAULT_NICHE)]
    niche: String,

    /// Tone passed to the prompt
    #[arg(long, default_value = DEFAULT_TONE)]
    tone: String,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct AttachArgs {
    /// Slide index (1-based)
    #[arg(long, conflicts_with = "cover", required_unless_present = "cover")]
    slide: Option<usize>,

    /// Attach to the cover background instead of a slide
    #[arg(long)]
    cover: bool,

    /// Local image path or http(s) URL; omit to remove the image
    #[arg(long)]
    image: Option<String>,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct EditArgs {
    /// Slide index (1-based)
    #[arg(long)]
    slide: usize,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    /// Body text; bullets are derived from it again
    #[arg(long)]
    body: Option<String>,

    /// imageLeft, imageRight, imageTop or imageBottom
    #[arg(long)]
    layout: Option<SlideLayout>,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct ThemeArgs {
    /// Start from a preset
    #[arg(long, value_enum)]
    variant: Option<CarouselVariant>,

    /// Profile handle shown on every slide
    #[arg(long)]
    handle: Option<String>,

    #[arg(long)]
    bg: Option<String>,

    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    accent: Option<String>,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct HtmlArgs {
    /// Path to output HTML file
    #[arg(short, long)]
    output: PathBuf,

    /// Leave the cover out of the preview
    #[arg(long)]
    no_cover: bool,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the output ZIP file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File name prefix inside the archive
    #[arg(long)]
    prefix: Option<String>,

    /// Device pixel ratio used for capture
    #[arg(long)]
    pixel_ratio: Option<f64>,

    /// Timeout for page loading in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Leave the cover out of the archive
    #[arg(long)]
    no_cover: bool,

    #[command(flatten)]
    deck: DeckArg,
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on (defaults to $PORT or 3333)
    #[arg(short, long)]
    port: Option<u16>,
}

fn read_input(input: &str) -> carousel::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        carousel::utils::validate_file_exists(Path::new(input))?;
        Ok(fs::read_to_string(input)?)
    }
}

fn run(command: Commands, config: Config) -> carousel::Result<()> {
    match command {
        Commands::Split(args) => {
            let text = read_input(&args.input)?;
            let slides = carousel::segment(&text, carousel::clamp_slide_count(args.count));

            let mut deck = Deck::load_or_default(&args.deck.deck)?;
            deck.replace_slides(slides);
            deck.save(&args.deck.deck)?;
            println!("Split into {} slides: {:?}", deck.slides.len(), args.deck.deck);
        }
        Commands::Generate(args) => {
            let generator = SlideGenerator::from_config(&config)?;
            let request = GenerationRequest {
                topic: args.topic,
                slide_count: carousel::clamp_slide_count(args.count),
                profile_niche: args.niche,
                tone: args.tone,
            };
            let slides = generator.generate(&request)?;

            let mut deck = Deck::load_or_default(&args.deck.deck)?;
            deck.replace_slides(slides);
            deck.save(&args.deck.deck)?;
            println!("Generated {} slides: {:?}", deck.slides.len(), args.deck.deck);
        }
        Commands::Attach(args) => {
            let mut deck = Deck::load(&args.deck.deck)?;
            let data_url = args
                .image
                .as_deref()
                .map(|source| ImageSource::new(source).data_url())
                .transpose()?;

            match args.slide {
                Some(index) if !args.cover => deck.attach_image(index, data_url)?,
                _ => deck.set_cover_background(data_url),
            }
            deck.save(&args.deck.deck)?;
        }
        Commands::Edit(args) => {
            let mut deck = Deck::load(&args.deck.deck)?;
            let slide = deck.slide_mut(args.slide)?;
            if let Some(title) = args.title {
                slide.title = title;
            }
            if let Some(subtitle) = args.subtitle {
                slide.style.show_subtitle = !subtitle.trim().is_empty();
                slide.subtitle = subtitle;
            }
            if let Some(body) = args.body {
                slide.bullets = carousel::segment::derive_bullets(&body);
                slide.body = body;
            }
            if let Some(layout) = args.layout {
                slide.layout = layout;
            }
            deck.save(&args.deck.deck)?;
        }
        Commands::Theme(args) => {
            let mut deck = Deck::load(&args.deck.deck)?;
            if let Some(variant) = args.variant {
                let handle = deck.theme.profile_handle.clone();
                deck.theme = CarouselTheme {
                    profile_handle: handle,
                    ..CarouselTheme::for_variant(variant)
                };
            }
            if let Some(handle) = args.handle {
                deck.cover.profile_handle = handle.clone();
                deck.theme.profile_handle = handle;
            }
            if let Some(bg) = args.bg {
                deck.theme.bg_color = bg;
            }
            if let Some(text) = args.text {
                deck.theme.text_color = text;
            }
            if let Some(accent) = args.accent {
                deck.theme.accent_color = accent;
            }
            deck.save(&args.deck.deck)?;
        }
        Commands::Html(args) => {
            let deck = Deck::load(&args.deck.deck)?;
            let html_content = carousel::generate_carousel_html(&deck, !args.no_cover);
            carousel::write_html_to_file(&html_content, &args.output)?;
            println!("HTML generated successfully: {:?}", args.output);
        }
        Commands::Export(args) => {
            let deck = Deck::load(&args.deck.deck)?;
            let render_config = config.get_render_config(args.pixel_ratio, args.timeout_ms);
            let export_config = config.get_export_config(args.prefix, !args.no_cover);
            let output = args
                .output
                .unwrap_or_else(|| PathBuf::from(&export_config.zip_name));

            carousel::export_carousel(&deck, &output, &render_config, &export_config)?;
            println!("Carousel exported successfully: {:?}", output);
        }
        Commands::Serve(args) => {
            let mut config = config;
            if let Some(port) = args.port {
                config.port = port;
            }
            carousel::server::serve(&config)?;
        }
    }
    Ok(())
}

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No command specified. Use --help for usage information.");
        return;
    };

    let result = Config::from_env().and_then(|config| {
        info!("Using model {}", config.openai_model);
        run(command, config)
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
