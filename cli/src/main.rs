//! kurdocx CLI - PDF to Word conversion with Kurdish-aware OCR

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use kurdocx::detect::DEFAULT_MIN_TEXT_CHARS;
use kurdocx::{
    inspect_pdf, AssemblerOptions, AttemptOutcome, Capabilities, ConvertOptions, DocxOptions,
    Inspection, LanguageSpec, OcrOptions, PreprocessOptions, StrategySelector, Tolerance, Tool,
    ToolPaths,
};

#[derive(Parser)]
#[command(name = "kurdocx")]
#[command(version)]
#[command(about = "Convert PDF documents to Word with Kurdish-aware OCR", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output DOCX file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    convert: ConvertArgs,

    #[command(flatten)]
    tools: ToolArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to DOCX
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output DOCX file (defaults to FILE with a .docx extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        convert: ConvertArgs,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check which conversion tools and OCR languages are installed
    Doctor {
        /// Languages to check for
        #[arg(short, long, env = "KURDOCX_LANG", default_value = "ckb")]
        lang: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ConvertArgs {
    /// OCR languages joined with '+' (e.g. ckb+ara+eng)
    #[arg(short, long, env = "KURDOCX_LANG", default_value = "ckb")]
    lang: String,

    /// Rasterization resolution for OCR
    #[arg(long, default_value = "300")]
    dpi: u32,

    /// Tesseract page segmentation mode
    #[arg(long, default_value = "6")]
    psm: u8,

    /// OCR even when the PDF has a text layer
    #[arg(long)]
    force_ocr: bool,

    /// Feed raw page images to the OCR engine
    #[arg(long)]
    no_preprocess: bool,

    /// Binarize page images before OCR
    #[arg(long)]
    binarize: bool,

    /// OCR pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Line tolerance: ratio of text height (0.5) or pixels (12px)
    #[arg(long, value_parser = parse_tolerance)]
    line_tolerance: Option<Tolerance>,

    /// Paragraph gap: ratio of text height (1.0) or pixels (40px)
    #[arg(long, value_parser = parse_tolerance)]
    paragraph_gap: Option<Tolerance>,

    /// Drop OCR words below this confidence (0-100)
    #[arg(long, default_value = "30")]
    min_confidence: f32,

    /// Characters needed before a PDF counts as having a text layer
    #[arg(long, default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    min_text_chars: usize,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Font family
    #[arg(long)]
    font: Option<String>,

    /// Font for Arabic-script text
    #[arg(long)]
    cs_font: Option<String>,

    /// Font size in points
    #[arg(long, default_value = "12")]
    font_size: f32,

    /// Join OCR lines of a paragraph instead of keeping line breaks
    #[arg(long)]
    join_lines: bool,

    /// Start each source page on a new page
    #[arg(long)]
    page_breaks: bool,
}

#[derive(Args, Clone, Default)]
struct ToolArgs {
    /// pdf2docx executable
    #[arg(long, env = "KURDOCX_PDF2DOCX", value_name = "PATH")]
    pdf2docx: Option<PathBuf>,

    /// ocrmypdf executable
    #[arg(long, env = "KURDOCX_OCRMYPDF", value_name = "PATH")]
    ocrmypdf: Option<PathBuf>,

    /// tesseract executable
    #[arg(long, env = "KURDOCX_TESSERACT", value_name = "PATH")]
    tesseract: Option<PathBuf>,

    /// pdftoppm executable
    #[arg(long, env = "KURDOCX_PDFTOPPM", value_name = "PATH")]
    pdftoppm: Option<PathBuf>,
}

impl ToolArgs {
    fn paths(&self) -> ToolPaths {
        [
            (Tool::Pdf2Docx, &self.pdf2docx),
            (Tool::Ocrmypdf, &self.ocrmypdf),
            (Tool::Tesseract, &self.tesseract),
            (Tool::Pdftoppm, &self.pdftoppm),
        ]
        .into_iter()
        .fold(ToolPaths::default(), |paths, (tool, program)| match program {
            Some(program) => paths.with_program(tool, program),
            None => paths,
        })
    }
}

impl ConvertArgs {
    fn options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        let language = LanguageSpec::parse(&self.lang)?;

        let mut assembler = AssemblerOptions::default();
        if let Some(tolerance) = self.line_tolerance {
            assembler = assembler.with_line_tolerance(tolerance);
        }
        if let Some(gap) = self.paragraph_gap {
            assembler = assembler.with_paragraph_gap(gap);
        }

        let preprocess = if self.no_preprocess {
            None
        } else {
            Some(PreprocessOptions::default().with_binarize(self.binarize))
        };

        let ocr = OcrOptions::new()
            .with_dpi(self.dpi)
            .with_psm(self.psm)
            .with_min_confidence(self.min_confidence)
            .with_preprocess(preprocess)
            .with_assembler(assembler);

        let mut docx = DocxOptions::new()
            .with_font_size(self.font_size)
            .with_line_breaks(!self.join_lines)
            .with_page_breaks(self.page_breaks);
        if let Some(ref font) = self.font {
            docx = docx.with_font(font);
        }
        if let Some(ref font) = self.cs_font {
            docx = docx.with_complex_script_font(font);
        }

        let mut options = ConvertOptions::new()
            .with_language(language)
            .with_force_ocr(self.force_ocr)
            .with_min_text_chars(self.min_text_chars)
            .with_parallel(!self.sequential)
            .with_ocr_options(ocr)
            .with_docx_options(docx);
        if let Some(ref title) = self.title {
            options = options.with_title(title);
        }
        Ok(options)
    }
}

/// Parse `0.5` as a height ratio and `12px` as pixels.
fn parse_tolerance(value: &str) -> Result<Tolerance, String> {
    let value = value.trim();
    let (number, pixels) = match value.strip_suffix("px") {
        Some(number) => (number, true),
        None => (value, false),
    };
    let number: f32 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid tolerance: {}", value))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!("tolerance must be a non-negative number: {}", value));
    }
    Ok(if pixels {
        Tolerance::Pixels(number)
    } else {
        Tolerance::HeightRatio(number)
    })
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            convert,
            tools,
        }) => cmd_convert(&input, output.as_deref(), &convert, &tools),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Doctor { lang, json, tools }) => cmd_doctor(&lang, json, &tools),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &cli.convert, &cli.tools)
            } else {
                println!("{}", "Usage: kurdocx <FILE> [OUTPUT]".yellow());
                println!("       kurdocx --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    args: &ConvertArgs,
    tools: &ToolArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.options()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("docx"));

    let pb = spinner("Checking conversion tools...")?;
    let capabilities = Capabilities::probe(&tools.paths());
    let selector = StrategySelector::with_defaults(capabilities);

    pb.set_message(format!("Converting {}...", input.display()));
    let result = selector.convert(input, &output, &options);
    pb.finish_and_clear();
    let result = result?;

    println!("{} {}", "Saved to".green(), result.output.display());
    println!("{}: {}", "Strategy".bold(), result.strategy);
    if let Some(count) = result.paragraph_count() {
        println!("{}: {}", "Paragraphs".bold(), count);
    }

    for attempt in &result.attempts {
        let line = format!("  {} {}", "├─".dimmed(), attempt);
        match attempt.outcome {
            AttemptOutcome::Succeeded => println!("{}", line),
            AttemptOutcome::Failed(_) => println!("{}", line.yellow()),
            AttemptOutcome::Skipped(_) => println!("{}", line.dimmed()),
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let inspection = inspect_pdf(input, DEFAULT_MIN_TEXT_CHARS)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), inspection.format);
    println!("{}: {}", "Pages".bold(), inspection.page_count);
    println!(
        "{}: {} of {} pages, {} characters",
        "Text layer".bold(),
        inspection.pages_with_text,
        inspection.page_count,
        inspection.text_chars
    );
    println!(
        "{}: {}",
        "Needs OCR".bold(),
        if inspection.has_text_layer { "No" } else { "Yes" }
    );

    Ok(())
}

fn cmd_doctor(lang: &str, json: bool, tools: &ToolArgs) -> Result<(), Box<dyn std::error::Error>> {
    let language = LanguageSpec::parse(lang)?;
    let capabilities = Capabilities::probe(&tools.paths());

    if json {
        println!("{}", serde_json::to_string_pretty(&capabilities)?);
        return Ok(());
    }

    println!("{}", "Conversion Tools".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for tool in Tool::ALL {
        match capabilities.version(tool) {
            Some(version) => println!("  {} {:<10} {}", "✓".green(), tool.name(), version.dimmed()),
            None => println!("  {} {:<10} {}", "✗".red(), tool.name(), "not found".red()),
        }
    }

    println!();
    println!("{}", "OCR Languages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if capabilities.ocr_languages.is_empty() {
        println!("  {}", "unknown".dimmed());
    } else {
        println!("  {}", capabilities.ocr_languages.join(", "));
    }
    for code in capabilities.missing_languages(&language) {
        println!(
            "  {} language data for '{}' is not installed",
            "warning:".yellow().bold(),
            code
        );
    }

    println!();
    println!("{}", "Strategies for scanned PDFs".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let options = ConvertOptions::new().with_language(language);
    let selector = StrategySelector::with_defaults(capabilities);
    for entry in selector.plan(&Inspection::scanned("1.7", 1), &options) {
        match entry.verdict {
            Ok(()) => println!("  {} {}", "✓".green(), entry.strategy),
            Err(e) => println!("  {} {} {}", "✗".red(), entry.strategy, format!("({})", e).dimmed()),
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "kurdocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to Word conversion with Kurdish-aware OCR");
    println!();
    println!("Languages: Sorani (ckb), Kurmanji (kmr), Arabic (ara), English (eng)");
    println!("License: MIT");
}
