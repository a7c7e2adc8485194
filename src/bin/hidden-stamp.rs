use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use hidden_stamp::validation::{DEFAULT_STAMP_TEXT, MAX_FILE_COUNT, MAX_TEXT_LENGTH};
use hidden_stamp::{ProcessResult, StampEngine, StampOptions, VerifyResult};

#[derive(Parser)]
#[command(
    name = "hidden-stamp",
    about = "Embed and recover invisible text stamps in images via LSB steganography",
    version,
    after_help = "Stamped images are always written as PNG. Lossy re-encoding (JPEG, WebP),\n\
                  cropping or resizing destroys the stamp.\n\n\
                  Set RUST_LOG=debug for codec diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a text stamp into one or more images
    Stamp(StampArgs),
    /// Look for a text stamp in one or more images
    Verify(VerifyArgs),
}

#[derive(Args)]
struct StampArgs {
    /// Input image files, or a single directory
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (default: next to each input, as {name}_stamped.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text to embed
    #[arg(short, long, default_value = DEFAULT_STAMP_TEXT)]
    text: String,
}

#[derive(Args)]
struct VerifyArgs {
    /// Image files to check
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    let text = match &cli.command {
        Command::Stamp(args) => args.text.clone(),
        Command::Verify(_) => String::new(),
    };
    let opts = StampOptions {
        text,
        verbose: cli.verbose,
        quiet: cli.quiet,
        ..StampOptions::default()
    };

    let engine = match StampEngine::new(&opts) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e} (limit is {MAX_TEXT_LENGTH} characters)");
            process::exit(1);
        }
    };

    let failed = match cli.command {
        Command::Stamp(args) => run_stamp(&engine, &args, &opts),
        Command::Verify(args) => run_verify(&engine, &args, &opts),
    };

    if failed > 0 {
        process::exit(1);
    }
}

/// Route library logs through `env_logger`; `RUST_LOG` overrides the flags.
fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_stamp(engine: &StampEngine, args: &StampArgs, opts: &StampOptions) -> u32 {
    for input in &args.inputs {
        if !input.exists() {
            eprintln!("Error: Input path does not exist: {}", input.display());
            process::exit(1);
        }
    }

    if !opts.quiet {
        eprintln!("Stamp text: {:?}", engine.text());
        eprintln!();
    }

    let results = match args.inputs.as_slice() {
        [dir] if dir.is_dir() => {
            let output_dir = args.output.clone().unwrap_or_else(|| dir.clone());
            engine.stamp_directory(dir, &output_dir)
        }
        inputs => match engine.stamp_files(inputs, args.output.as_deref()) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!("At most {MAX_FILE_COUNT} files per run; pass a directory for more.");
                process::exit(1);
            }
        },
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;
    for r in &results {
        print_stamp_result(r, opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Stamped: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    fail_count
}

fn run_verify(engine: &StampEngine, args: &VerifyArgs, opts: &StampOptions) -> u32 {
    let results = match engine.verify_files(&args.inputs) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut found_count = 0u32;
    let mut fail_count = 0u32;
    for r in &results {
        print_verify_result(r, opts);
        if !r.success {
            fail_count += 1;
        } else if r.verification.found {
            found_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Found: {found_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    fail_count
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

fn print_stamp_result(result: &ProcessResult, opts: &StampOptions) {
    let filename = display_name(&result.path);

    if result.success {
        if !opts.quiet {
            match &result.output {
                Some(out) => eprintln!("[OK] {filename} -> {}", out.display()),
                None => eprintln!("[OK] {filename}"),
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && result.success && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}

/// Found stamps go to stdout so they can be piped; status goes to stderr.
fn print_verify_result(result: &VerifyResult, opts: &StampOptions) {
    let filename = display_name(&result.path);

    if !result.success {
        eprintln!("[FAIL] {filename}: {}", result.message);
        return;
    }

    match &result.verification.text {
        Some(text) if result.verification.found => println!("[FOUND] {filename}: {text}"),
        _ => {
            if !opts.quiet {
                println!("[NONE] {filename}");
            }
        }
    }

    if opts.verbose {
        eprintln!("  -> {}", result.message);
    }
}
