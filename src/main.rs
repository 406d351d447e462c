use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use paperflow_pdf::{
    Artifact, BuildConfig, DocumentAssembler, Error, FontSource, Recorder, RenderSummary,
};

#[derive(Parser)]
#[command(name = "paperflow-pdf", version, about = "Render marked-up text or page snapshots into paginated PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Paginate a UTF-8 text file with **bold** markup
    Text {
        input: PathBuf,
        #[command(flatten)]
        opts: CommonOpts,
    },
    /// Slice a PNG snapshot into pages
    Snapshot {
        input: PathBuf,
        /// Rows dropped from each non-final slice to avoid cutting text
        #[arg(long)]
        slice_buffer: Option<u32>,
        #[command(flatten)]
        opts: CommonOpts,
    },
}

#[derive(Args)]
struct CommonOpts {
    /// Header title
    #[arg(long)]
    title: Option<String>,
    /// Footer copyright text
    #[arg(long)]
    footer: Option<String>,
    /// Filename field as key=value, e.g. --field board=CBSE
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(String, String)>,
    /// Filename template with {field} placeholders
    #[arg(long)]
    template: Option<String>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, conflicts_with = "no_page_limit")]
    max_pages: Option<usize>,
    #[arg(long)]
    no_page_limit: bool,
    /// Regular TrueType font to embed instead of Helvetica
    #[arg(long, requires = "bold_font")]
    font: Option<PathBuf>,
    #[arg(long, requires = "font")]
    bold_font: Option<PathBuf>,
    /// Lay out and report the page count without writing a file
    #[arg(long)]
    dry_run: bool,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    Ok((k.trim().to_string(), v.to_string()))
}

impl CommonOpts {
    fn apply(&self, config: &mut BuildConfig) -> Result<(), Error> {
        if let Some(title) = &self.title {
            config.header.title = title.clone();
            config.title = Some(title.clone());
        }
        if let Some(footer) = &self.footer {
            config.footer.copyright = footer.clone();
        }
        if let Some(template) = &self.template {
            config.filename_template = template.clone();
        }
        if self.no_page_limit {
            config.metrics.max_pages = None;
        } else if let Some(max) = self.max_pages {
            config.metrics.max_pages = Some(max);
        }
        if let (Some(regular), Some(bold)) = (&self.font, &self.bold_font) {
            config.font = FontSource::TrueType {
                regular: std::fs::read(regular)?,
                bold: std::fs::read(bold)?,
            };
        }
        Ok(())
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

fn write_artifact(out_dir: &Path, artifact: &Artifact) -> Result<(), Error> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes)?;
    println!("{} ({} pages)", path.display(), artifact.page_count);
    Ok(())
}

fn report_dry_run(summary: &RenderSummary) {
    println!("{} pages", summary.page_count);
    for (i, slice) in summary.slices.iter().enumerate() {
        println!(
            "  page {}: rows {}..{}",
            i + 1,
            slice.source_y_offset,
            slice.source_y_offset + slice.height_px
        );
    }
}

fn load_png(path: &Path) -> Result<image::RgbaImage, Error> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let decoded = reader
        .decode()
        .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;
    Ok(decoded.to_rgba8())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Text { input, opts } => {
            let mut config = BuildConfig::text();
            opts.apply(&mut config)?;
            let text = std::fs::read_to_string(&input)?;
            let assembler = DocumentAssembler::new(&config);
            if opts.dry_run {
                let summary = assembler.render_text(&mut Recorder::new(), &text)?;
                report_dry_run(&summary);
                return Ok(());
            }
            let artifact = assembler.build_text(&text, &opts.field_refs())?;
            write_artifact(&opts.out_dir, &artifact)
        }
        Command::Snapshot {
            input,
            slice_buffer,
            opts,
        } => {
            let mut config = BuildConfig::snapshot();
            opts.apply(&mut config)?;
            if let Some(buffer) = slice_buffer {
                config.metrics.slice_buffer_px = buffer;
            }
            let snapshot = load_png(&input)?;
            let assembler = DocumentAssembler::new(&config);
            if opts.dry_run {
                let summary = assembler.render_snapshot(&mut Recorder::new(), &snapshot)?;
                report_dry_run(&summary);
                return Ok(());
            }
            let artifact = assembler.build_snapshot(&snapshot, &opts.field_refs())?;
            write_artifact(&opts.out_dir, &artifact)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
