use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, Result};

use weft::Image;

/// Weft is an assembler toolchain for a 16-bit, 32-register teaching RISC processor.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to assemble
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a `.asm` file into a `.mif` program memory image
    Assemble {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination to output the `.mif` image
        dest: Option<PathBuf>,
    },
    /// Check a `.asm` file without writing an image
    Check {
        /// File to check
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(weft::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Assemble { name, dest } => assemble_to_file(&name, dest),
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                let _ = assemble_or_report(&contents)?;
                message(Green, "Success", "no errors found!");
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        assemble_to_file(&path, None)
    } else {
        println!("\n~ weft v{VERSION} ~");
        println!("{SHORT_INFO}");
        std::process::exit(0);
    }
}

fn assemble_to_file(name: &PathBuf, dest: Option<PathBuf>) -> Result<()> {
    file_message(MsgColor::Green, "Assembling", name);
    let contents = fs::read_to_string(name).into_diagnostic()?;
    let image = assemble_or_report(&contents)?;

    let out_file_name = dest.unwrap_or(name.with_extension("mif").file_name().unwrap().into());
    // The image is rendered in full before any I/O, so a failing run can
    // never leave a truncated file behind
    fs::write(&out_file_name, image.render()).into_diagnostic()?;

    message(MsgColor::Green, "Finished", "emit program image");
    file_message(MsgColor::Green, "Saved", &out_file_name);
    Ok(())
}

/// Run the assembler, printing every accumulated diagnostic on failure.
fn assemble_or_report(contents: &str) -> Result<Image> {
    match weft::assemble(contents) {
        Ok(image) => Ok(image),
        Err(diags) => {
            let count = diags.len();
            for diag in diags {
                eprintln!("{:?}", diag);
            }
            bail!("Assembly failed with {count} error(s)");
        }
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.to_str().unwrap());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

const SHORT_INFO: &str = r"
Welcome to weft, an assembler for a 16-bit, 32-register teaching RISC
processor. It turns `.asm` mnemonic programs into `.mif` program memory
images ready to load into the CPU.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
